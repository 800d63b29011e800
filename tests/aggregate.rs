use anyhow::{bail, Result};
use ironcollect::aggregate::{compute_if_absent, merge, try_compute_if_absent, try_merge};
use ironcollect::*;
use std::collections::{BTreeMap, HashMap};

fn sum(a: &i32, b: i32) -> Option<i32> {
    Some(a + b)
}

#[test]
fn merge_inserts_then_combines() {
    let mut m: HashMap<&str, i32> = HashMap::new();
    assert_eq!(merge(&mut m, "x", 5, sum).copied(), Some(5));
    assert_eq!(m, HashMap::from([("x", 5)]));
    assert_eq!(merge(&mut m, "x", 3, sum).copied(), Some(8));
    assert_eq!(m, HashMap::from([("x", 8)]));
}

#[test]
fn repeated_merges_equal_one_merge_of_the_total() {
    let mut stepwise: BTreeMap<&str, i32> = BTreeMap::new();
    for v in [4, -2, 9, 1] {
        merge(&mut stepwise, "k", v, sum);
    }
    let mut once: BTreeMap<&str, i32> = BTreeMap::new();
    merge(&mut once, "k", 4 - 2 + 9 + 1, sum);
    assert_eq!(stepwise, once);
}

#[test]
fn combiner_returning_none_removes_the_key() {
    let mut m = HashMap::from([("gone", 1), ("kept", 2)]);
    assert!(merge(&mut m, "gone", 7, |_, _| None).is_none());
    assert!(!m.contains_key("gone"));
    assert_eq!(m["kept"], 2);

    // An absent key is inserted without consulting the combiner.
    assert_eq!(merge(&mut m, "new", 3, |_, _| None).copied(), Some(3));
}

#[test]
fn merge_appends_and_concatenates() {
    let mut lists: HashMap<&str, Vec<u32>> = HashMap::new();
    for (k, v) in [("odd", 1), ("even", 2), ("odd", 3)] {
        merge(&mut lists, k, vec![v], |old, new| Some([old.as_slice(), &new].concat()));
    }
    assert_eq!(lists["odd"], vec![1, 3]);

    let mut names: HashMap<u32, String> = HashMap::new();
    for (id, n) in [(1, "ada"), (2, "bob"), (1, "lovelace")] {
        merge(&mut names, id, n.to_string(), |old, new| Some(format!("{old} {new}")));
    }
    assert_eq!(names[&1], "ada lovelace");
}

#[test]
fn live_reference_from_merge_mutates_the_entry() {
    let mut m: HashMap<&str, i32> = HashMap::new();
    if let Some(v) = merge(&mut m, "x", 1, sum) {
        *v *= 10;
    }
    assert_eq!(m["x"], 10);
}

#[test]
fn failing_combiner_leaves_the_key_untouched() {
    let mut m = HashMap::from([("x", 5)]);
    let err = try_merge(&mut m, "x", 3, |_, _| -> Result<Option<i32>> { bail!("overflow") }).unwrap_err();
    assert!(matches!(err, AggregationError::Combiner { .. }));
    assert_eq!(err.cause().to_string(), "overflow");
    assert_eq!(m["x"], 5);

    let ok = try_merge(&mut m, "x", 3i32, |a, b| Ok(Some(a + b))).map(|v| v.copied());
    assert_eq!(ok.ok().flatten(), Some(8));
}

#[test]
fn panicking_combiner_keeps_the_previous_value() {
    let mut m = HashMap::from([("x", 5i32)]);
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        merge(&mut m, "x", i32::MAX, |a, b| Some(a.checked_add(b).expect("overflow")));
    }));
    assert!(outcome.is_err());
    assert_eq!(m, HashMap::from([("x", 5)]));

    assert_eq!(merge(&mut m, "x", 3, sum).copied(), Some(8));
}

#[test]
fn compute_if_absent_returns_the_same_live_counter() {
    let mut m: HashMap<String, u32> = HashMap::new();
    let mut calls = 0;
    for _ in 0..3 {
        let counter = compute_if_absent(&mut m, "hits".to_string(), |_| {
            calls += 1;
            0
        });
        *counter += 1;
    }
    assert_eq!(calls, 1);
    assert_eq!(m["hits"], 3);
}

#[test]
fn failing_factory_inserts_nothing() {
    let mut m: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    let err = try_compute_if_absent(&mut m, 1, |k| -> Result<Vec<u32>> { bail!("no list for {k}") }).unwrap_err();
    assert!(matches!(err, AggregationError::Factory { .. }));
    assert!(m.is_empty());

    let list = try_compute_if_absent(&mut m, 1, |_| Ok(Vec::new()));
    assert!(list.is_ok());
    assert_eq!(m.len(), 1);
}

#[cfg(feature = "concurrent")]
#[test]
fn concurrent_counters_from_many_threads() {
    use std::sync::atomic::{AtomicU64, Ordering};

    let hits: ConcurrentAggregator<u32, AtomicU64> = ConcurrentAggregator::new();
    rayon::scope(|s| {
        for t in 0..8u32 {
            let hits = &hits;
            s.spawn(move |_| {
                for i in 0..1000u32 {
                    hits.compute_if_absent((i + t) % 10, |_| AtomicU64::new(0))
                        .fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });
    assert_eq!(hits.len(), 10);
    let total: u64 = hits
        .into_inner()
        .into_iter()
        .map(|(_, v)| v.into_inner())
        .sum();
    assert_eq!(total, 8000);
}

#[cfg(feature = "concurrent")]
#[test]
fn concurrent_merge_matches_sequential_sums() {
    let agg: ConcurrentAggregator<u32, u64> = ConcurrentAggregator::new();
    rayon::scope(|s| {
        for chunk in 0..4u64 {
            let agg = &agg;
            s.spawn(move |_| {
                for x in (chunk * 250)..((chunk + 1) * 250) {
                    let k = (x % 5) as u32;
                    agg.merge(k, x, |a, b| Some(a + b));
                }
            });
        }
    });

    let mut expected: HashMap<u32, u64> = HashMap::new();
    for x in 0..1000u64 {
        merge(&mut expected, (x % 5) as u32, x, |a, b| Some(a + b));
    }
    assert_eq!(agg.snapshot(), expected);

    assert!(agg.merge(0, 0, |_, _| None).is_none());
    assert!(!agg.contains_key(&0));
    assert_eq!(agg.get(&1), expected.get(&1).copied());

    let failed = agg.try_merge(1, 1, |_, _| -> Result<Option<u64>> { bail!("nope") });
    assert!(matches!(failed, Err(AggregationError::Combiner { .. })));
    assert_eq!(agg.get(&1), expected.get(&1).copied());
}

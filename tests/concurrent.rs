#![cfg(feature = "concurrent")]

use anyhow::Result;
use ironcollect::*;
use std::collections::{BTreeMap, HashMap};

fn sorted<K: Ord, V>(m: impl IntoIterator<Item = (K, V)>) -> BTreeMap<K, V> {
    m.into_iter().collect()
}

#[test]
fn concurrent_grouping_equals_sequential_grouping_under_stress() -> Result<()> {
    let input: Vec<u32> = (0..50_000).map(|i| (i * 7919) % 10_007).collect();

    let expected = collect(input.clone(), &grouping_by(|x: &u32| x % 97, Count))?;
    let expected: BTreeMap<u32, u64> = expected.into_iter().collect();

    for partitions in [1, 2, 7, 64, 512] {
        let out = Runner::parallel(Some(8), Some(partitions))
            .run(input.clone(), &grouping_by_concurrent(|x: &u32| x % 97, Count))?;
        assert_eq!(sorted(out), expected, "partitions = {partitions}");
    }
    Ok(())
}

#[test]
fn concurrent_grouping_on_a_single_hot_key() -> Result<()> {
    let input: Vec<u32> = (0..50_000).collect();
    for partitions in [2, 8, 64, 512] {
        let out = Runner::parallel(Some(8), Some(partitions)).run(
            input.clone(),
            &grouping_by_concurrent(|_: &u32| "all", mapping(|x: u32| u64::from(x), Sum::<u64>::new())),
        )?;
        assert_eq!(out.len(), 1, "partitions = {partitions}");
        assert_eq!(out.get("all").map(|r| *r.value()), Some(1_249_975_000));

        let counted = Runner::parallel(Some(8), Some(partitions))
            .run(input.clone(), &grouping_by_concurrent(|_: &u32| 0u8, Count))?;
        assert_eq!(counted.get(&0).map(|r| *r.value()), Some(50_000));
    }
    Ok(())
}

#[test]
fn concurrent_grouping_with_set_downstream() -> Result<()> {
    let words = vec!["apple", "avocado", "banana", "apple", "blueberry", "cherry", "banana"];
    let c = grouping_by_concurrent(|w: &&str| w.len(), mapping(|w: &str| w.to_string(), to_set()));
    let out = sorted(collect_par(words.clone(), &c, 4)?);
    let seq = sorted(collect(words, &c)?);
    assert_eq!(out, seq);
    assert_eq!(out[&6].len(), 2); // banana, cherry
    assert_eq!(out[&5].len(), 1); // apple
    Ok(())
}

#[test]
fn concurrent_grouping_nested_under_plain_grouping() -> Result<()> {
    // The outer grouping merges per-partition inner maps, exercising the
    // non-shared merge path of the concurrent collector.
    let c = grouping_by(
        |x: &u32| x % 2,
        grouping_by_concurrent(|x: &u32| x % 3, Count),
    );
    let out = collect_par(0..600u32, &c, 6)?;
    let flat: HashMap<(u32, u32), u64> = out
        .into_iter()
        .flat_map(|(a, inner)| inner.into_iter().map(move |(b, n)| ((a, b), n)))
        .collect();
    assert_eq!(flat.len(), 6);
    assert!(flat.values().all(|n| *n == 100));
    Ok(())
}

#[test]
fn to_concurrent_map_across_partitions() -> Result<()> {
    let ids = (0..1000u32).map(|i| (i, format!("user-{i}")));
    let m = collect_par(ids, &to_concurrent_map(|p: &(u32, String)| p.0, |p: (u32, String)| p.1), 16)?;
    assert_eq!(m.len(), 1000);
    assert_eq!(m.get(&42).map(|r| r.value().clone()).as_deref(), Some("user-42"));
    Ok(())
}

#[test]
fn to_concurrent_map_duplicates() -> Result<()> {
    let rows = vec![(1u32, 10u64), (2, 20), (1, 5)];
    assert!(collect_par(rows.clone(), &to_concurrent_map(|p: &(u32, u64)| p.0, |p: (u32, u64)| p.1), 3).is_err());

    let merged = collect_par(
        rows,
        &to_concurrent_map_merging(|p: &(u32, u64)| p.0, |p: (u32, u64)| p.1, |a: &mut u64, b: u64| *a += b),
        3,
    )?;
    assert_eq!(sorted(merged), BTreeMap::from([(1, 15), (2, 20)]));
    Ok(())
}

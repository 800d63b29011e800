//! Walk-through of the collector engine on small inputs.
//!
//! Run with `RUST_LOG=ironcollect=debug cargo run --example snippets` to see
//! the engine's run and partition events.

use anyhow::Result;
use ironcollect::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

const SENTENCE: &str = "This implementation assumes that the ConcurrentMap cannot contain null values and returning null unambiguously means the key is absent";

#[derive(Clone, Debug)]
struct Person {
    name: String,
    sex: &'static str,
}

fn people(names: impl Fn(usize) -> String) -> Vec<Person> {
    (0..10)
        .map(|i| Person {
            name: names(i),
            sex: if i % 2 == 0 { "Male" } else { "Female" },
        })
        .collect()
}

fn letters() -> Vec<String> {
    SENTENCE
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| c.to_ascii_lowercase().to_string())
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Filter, peek, map, collect.
    let upper = from_vec(vec!["one", "two", "three", "four"])
        .filter(|e| e.len() > 3)
        .inspect(|e| print!("Filtered value: {e} -> "))
        .map(str::to_uppercase)
        .inspect(|e| println!("Upper value: {e}"))
        .collect_seq(&to_vec())?;
    println!("{upper:?}");

    // Concurrent grouping by sex.
    let by_sex = from_vec(people(|i| format!("person-{i}")))
        .collect_par(&grouping_by_concurrent(|p: &Person| p.sex, to_vec()), None, Some(4))?;
    for entry in by_sex.iter() {
        println!("{} -> {:?}", entry.key(), entry.value().iter().map(|p| &p.name).collect::<Vec<_>>());
    }

    // Name -> person, concurrently.
    let by_name = collect_par(
        people(|i| format!("person-{i}")),
        &to_concurrent_map(|p: &Person| p.name.clone(), |p: Person| p),
        4,
    )?;
    println!("{} people by name", by_name.len());

    // Nested grouping: sex, then name.
    let nested = collect_par(
        people(|i| (i % 3).to_string()),
        &grouping_by_concurrent(
            |p: &Person| p.sex,
            grouping_by_ordered(|p: &Person| p.name.clone(), Count),
        ),
        4,
    )?;
    for entry in nested.iter() {
        println!("{} -> {:?}", entry.key(), entry.value());
    }

    // Closure-built collector into a list of character codes.
    let codes = collect(
        letters(),
        &collector(
            Vec::new,
            |acc: &mut Vec<String>, s: String| acc.extend(s.chars().map(|c| u32::from(c).to_string())),
            |acc: &mut Vec<String>, other: Vec<String>| acc.extend(other),
        ),
    )?;
    println!("{} codes, first {:?}", codes.len(), &codes[..5.min(codes.len())]);

    // Letter frequencies, three ways.
    let freq = collect_par(letters(), &grouping_by_ordered(|s: &String| s.clone(), Count), 8)?;
    println!("{freq:?}");
    let freq_mapped = collect(
        letters(),
        &grouping_by_ordered(|s: &String| s.clone(), mapping(|s: String| s, to_set())),
    )?;
    println!("{} distinct letters", freq_mapped.len());

    let stats = collect(
        letters(),
        &mapping(|s: String| s.chars().next().map_or(0, u32::from), SummaryStatistics),
    )?;
    println!(
        "count={} sum={} min={:?} max={:?} avg={}",
        stats.count,
        stats.sum,
        stats.min,
        stats.max,
        stats.average()
    );

    // Map merge: concatenation and sums.
    let mut places = std::collections::HashMap::from([("wukong".to_string(), "flower-fruit mountain".to_string())]);
    aggregate::merge(&mut places, "wukong".to_string(), " water-curtain cave".to_string(), |a, b| Some(format!("{a}{b}")));
    aggregate::merge(&mut places, "bajie".to_string(), "heavenly river".to_string(), |a, b| Some(format!("{a}{b}")));
    println!("{places:?}");

    let mut counts = std::collections::BTreeMap::new();
    for s in letters() {
        aggregate::merge(&mut counts, s, 1u64, |a, b| Some(a + b));
    }
    println!("{counts:?}");

    // compute_if_absent with shared counters.
    let hits: ConcurrentAggregator<String, AtomicU64> = ConcurrentAggregator::new();
    rayon::scope(|s| {
        for chunk in letters().chunks(16) {
            let hits = &hits;
            let chunk = chunk.to_vec();
            s.spawn(move |_| {
                for l in chunk {
                    hits.compute_if_absent(l, |_| AtomicU64::new(0))
                        .fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });
    let mut snapshot: Vec<(String, u64)> = hits
        .into_inner()
        .into_iter()
        .map(|(k, v)| (k, v.into_inner()))
        .collect();
    snapshot.sort();
    println!("{snapshot:?}");

    let (_, metrics) = Runner::parallel(Some(4), Some(8)).run_with_metrics(letters(), &Count)?;
    println!("{}", metrics.to_json()?);
    Ok(())
}

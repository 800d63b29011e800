use anyhow::{anyhow, bail, Result};
use ironcollect::*;

/// Collector whose merge always fails, to observe when merging happens.
fn merge_forbidden() -> impl Collector<u32, Acc = Vec<u32>, Out = Vec<u32>> {
    try_collector(
        || Ok(Vec::new()),
        |acc: &mut Vec<u32>, v: u32| {
            acc.push(v);
            Ok(())
        },
        |_: &mut Vec<u32>, _: Vec<u32>| Err(anyhow!("merge called")),
    )
}

#[test]
fn sequential_collect_keeps_encounter_order() -> Result<()> {
    let out = collect(vec![3u32, 1, 2], &to_vec())?;
    assert_eq!(out, vec![3, 1, 2]);
    Ok(())
}

#[test]
fn parallel_collect_keeps_encounter_order() -> Result<()> {
    let out = collect_par(0..1000u32, &to_vec(), 7)?;
    assert_eq!(out, (0..1000).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn closure_collector_builds_a_string() -> Result<()> {
    let joined = collector(
        String::new,
        |acc: &mut String, c: char| acc.push(c),
        |a: &mut String, b: String| a.push_str(&b),
    );
    assert_eq!(collect("parallel".chars(), &joined)?, "parallel");
    assert_eq!(collect_par("parallel".chars(), &joined, 3)?, "parallel");
    Ok(())
}

#[test]
fn accumulator_can_replace_the_container() -> Result<()> {
    // Keeps only the latest element by reassigning through the reference.
    let last = collector(
        || None,
        |acc: &mut Option<u32>, v: u32| *acc = Some(v),
        |a: &mut Option<u32>, b: Option<u32>| {
            if b.is_some() {
                *a = b;
            }
        },
    );
    assert_eq!(collect(1..=5u32, &last)?, Some(5));
    assert_eq!(collect_par(1..=5u32, &last, 2)?, Some(5));
    Ok(())
}

#[test]
fn single_partition_never_merges() -> Result<()> {
    let c = merge_forbidden();
    assert_eq!(collect(0..10u32, &c)?.len(), 10);
    assert_eq!(collect_par(0..10u32, &c, 1)?.len(), 10);
    // Fewer elements than partitions requested.
    assert_eq!(collect_par(vec![7u32], &c, 8)?, vec![7]);
    assert!(collect_par(Vec::<u32>::new(), &c, 8)?.is_empty());
    Ok(())
}

#[test]
fn several_partitions_do_merge() {
    let err = collect_par(0..10u32, &merge_forbidden(), 2).unwrap_err();
    assert!(matches!(err, ReductionError::Merge { .. }), "{err}");
    assert!(err.to_string().contains("merge called"));
}

#[test]
fn empty_sequence_yields_the_empty_container() -> Result<()> {
    assert_eq!(collect(Vec::<u32>::new(), &Count)?, 0);
    assert_eq!(collect_par(Vec::<u32>::new(), &Count, 4)?, 0);
    assert_eq!(collect(Vec::<u32>::new(), &Max::<u32>::new())?, None);
    Ok(())
}

#[test]
fn accumulation_failure_names_the_partition() {
    let picky = try_collector(
        || Ok(0u64),
        |acc: &mut u64, v: u32| {
            if v == 60 {
                bail!("refusing {v}");
            }
            *acc += u64::from(v);
            Ok(())
        },
        |a: &mut u64, b: u64| {
            *a += b;
            Ok(())
        },
    );

    // 100 elements in 4 partitions of 25: element 60 lands in partition 2.
    let err = collect_par(0..100u32, &picky, 4).unwrap_err();
    assert!(matches!(err, ReductionError::Accumulate { partition: 2, .. }), "{err}");
    assert_eq!(err.cause().map(ToString::to_string).as_deref(), Some("refusing 60"));
    assert!(std::error::Error::source(&err).is_some());

    let err = collect(0..100u32, &picky).unwrap_err();
    assert!(matches!(err, ReductionError::Accumulate { partition: 0, .. }));
}

#[test]
fn creation_failure_aborts_the_run() {
    let broken = try_collector(
        || -> Result<u64> { bail!("no container") },
        |_: &mut u64, _: u32| Ok(()),
        |_: &mut u64, _: u64| Ok(()),
    );
    assert!(matches!(collect(0..3u32, &broken), Err(ReductionError::Create { .. })));
    assert!(matches!(collect_par(0..30u32, &broken, 3), Err(ReductionError::Create { .. })));
}

#[test]
fn finish_failure_aborts_the_run() {
    let c = try_collecting_and_then(to_vec::<u32>(), |v: Vec<u32>| -> Result<usize> {
        if v.len() > 3 {
            bail!("too many: {}", v.len());
        }
        Ok(v.len())
    });
    assert_eq!(collect(0..3u32, &c).ok(), Some(3));
    let err = collect_par(0..10u32, &c, 4).unwrap_err();
    assert!(matches!(err, ReductionError::Finish { .. }));
    assert!(err.to_string().contains("too many: 10"));
}

#[test]
fn dedicated_pool_matches_global_pool() -> Result<()> {
    let dedicated = Runner::parallel(Some(2), Some(16)).run(0..10_000u64, &Sum::<u64>::new())?;
    let global = Runner::parallel(None, Some(16)).run(0..10_000u64, &Sum::<u64>::new())?;
    assert_eq!(dedicated, global);
    assert_eq!(dedicated, (0..10_000u64).sum::<u64>());
    Ok(())
}

#[test]
fn fanout_merge_keeps_partition_order() -> Result<()> {
    let runner = Runner::parallel(None, Some(10)).with_fanout(3);
    let out = runner.run(0..97u32, &to_vec())?;
    assert_eq!(out, (0..97).collect::<Vec<_>>());

    let joined = runner.run((0..12).map(|i| i.to_string()), &Joining::new("-"))?;
    assert_eq!(joined, "0-1-2-3-4-5-6-7-8-9-10-11");
    Ok(())
}

#[test]
fn runner_loads_from_json() -> Result<()> {
    let r = Runner::from_json(r#"{"mode":"Sequential","default_partitions":4,"fanout":null}"#)?;
    assert_eq!(r.mode, ExecMode::Sequential);
    assert_eq!(collect(0..5u32, &Count)?, r.run(0..5u32, &Count)?);

    let r = Runner::from_json(
        r#"{"mode":{"Parallel":{"threads":2,"partitions":null}},"default_partitions":3,"fanout":2}"#,
    )?;
    assert_eq!(r.fanout, Some(2));
    assert_eq!(r.run(0..50u32, &to_vec())?, (0..50).collect::<Vec<_>>());

    assert!(Runner::from_json(r#"{"mode":"Sideways"}"#).is_err());
    Ok(())
}

#[test]
fn stream_front_end_runs_every_mode() -> Result<()> {
    let words = vec!["one", "two", "three", "four"];

    let seq = from_vec(words.clone())
        .filter(|s| s.len() > 3)
        .map(str::to_uppercase)
        .collect_seq(&to_vec())?;
    assert_eq!(seq, vec!["THREE", "FOUR"]);

    let par = from_vec(words.clone())
        .filter(|s| s.len() > 3)
        .map(str::to_uppercase)
        .collect_par(&to_vec(), Some(2), Some(3))?;
    assert_eq!(par, seq);

    let mut seen = 0;
    let letters = from_iter(words)
        .inspect(|_| seen += 1)
        .flat_map(str::chars)
        .collect_with(&Runner::sequential(), &Count)?;
    assert_eq!(seen, 4);
    assert_eq!(letters, 15);
    Ok(())
}

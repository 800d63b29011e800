#![cfg(feature = "metrics")]

use anyhow::Result;
use ironcollect::*;

#[test]
fn sequential_run_reports_one_partition_and_no_merges() -> Result<()> {
    let (n, m) = Runner::sequential().run_with_metrics(0..250u32, &Count)?;
    assert_eq!(n, 250);
    assert_eq!(m.mode, ExecMode::Sequential);
    assert_eq!((m.partitions, m.elements, m.merges), (1, 250, 0));
    Ok(())
}

#[test]
fn parallel_run_reports_partition_merges() -> Result<()> {
    let (_, m) = Runner::parallel(None, Some(8)).run_with_metrics(0..1000u32, &to_vec())?;
    assert_eq!((m.partitions, m.elements, m.merges), (8, 1000, 7));

    // Fewer elements than partitions: one partition per element.
    let (_, m) = Runner::parallel(None, Some(8)).run_with_metrics(0..3u32, &Count)?;
    assert_eq!((m.partitions, m.merges), (3, 2));

    let (_, m) = Runner::parallel(None, Some(8)).run_with_metrics(0..1u32, &Count)?;
    assert_eq!((m.partitions, m.merges), (1, 0));
    Ok(())
}

#[cfg(feature = "concurrent")]
#[test]
fn shared_container_runs_skip_merging() -> Result<()> {
    let c = grouping_by_concurrent(|x: &u32| x % 3, Count);
    let (out, m) = Runner::parallel(Some(4), Some(16)).run_with_metrics(0..3000u32, &c)?;
    assert_eq!(out.len(), 3);
    assert_eq!((m.partitions, m.elements, m.merges), (16, 3000, 0));
    Ok(())
}

#[test]
fn metrics_serialize_to_json() -> Result<()> {
    let (_, m) = Runner::parallel(None, Some(4)).run_with_metrics(0..100u32, &Count)?;
    let v = m.to_value();
    assert_eq!(v["partitions"], 4);
    assert_eq!(v["merges"], 3);
    assert_eq!(v["mode"]["Parallel"]["partitions"], 4);
    assert!(m.to_json()?.contains("\"elements\": 100"));
    Ok(())
}

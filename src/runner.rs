//! Execution engine: drives a sequence through a [`Collector`].
//!
//! - [`ExecMode::Sequential`] folds every element into one container, in order,
//!   and never calls `merge`.
//! - [`ExecMode::Parallel`] splits the sequence into contiguous, size-balanced
//!   partitions, folds each partition on the rayon pool, then merges the partial
//!   containers in partition-index order before finishing once.
//!
//! A [`Runner`] is plain configuration and can be loaded from JSON:
//!
//! ```
//! use ironcollect::{ExecMode, Runner};
//!
//! let r = Runner::from_json(r#"{"mode":{"Parallel":{"threads":null,"partitions":4}},"default_partitions":8,"fanout":null}"#)?;
//! assert_eq!(r.mode, ExecMode::Parallel { threads: None, partitions: Some(4) });
//! # anyhow::Result::<()>::Ok(())
//! ```

use crate::collector::Collector;
use crate::error::ReductionError;
use anyhow::{anyhow, Context};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecMode {
    Sequential,
    /// `threads`: size of a dedicated worker pool (global rayon pool when `None`).
    /// `partitions`: partition count (the runner default when `None`).
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Runner {
    pub mode: ExecMode,
    pub default_partitions: usize,
    /// Merge partial containers in rounds of at most this many (plain left fold when `None`).
    pub fanout: Option<usize>,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
            fanout: None,
        }
    }
}

/// Counters gathered while a run executes.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Tally {
    pub partitions: usize,
    pub elements: usize,
    pub merges: usize,
    pub elapsed: Duration,
}

impl Runner {
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
    }

    pub fn parallel(threads: Option<usize>, partitions: Option<usize>) -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads,
                partitions,
            },
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = Some(fanout);
        self
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("invalid runner configuration")
    }

    /// Collect `input` with `coll` according to this runner's mode.
    pub fn run<T, I, C>(&self, input: I, coll: &C) -> Result<C::Out, ReductionError>
    where
        I: IntoIterator<Item = T>,
        T: Send,
        C: Collector<T> + ?Sized,
    {
        self.run_tallied(input, coll).map(|(out, _)| out)
    }

    /// Like [`run`](Runner::run), also reporting what the run did.
    #[cfg(feature = "metrics")]
    pub fn run_with_metrics<T, I, C>(
        &self,
        input: I,
        coll: &C,
    ) -> Result<(C::Out, crate::metrics::CollectMetrics), ReductionError>
    where
        I: IntoIterator<Item = T>,
        T: Send,
        C: Collector<T> + ?Sized,
    {
        let (out, tally) = self.run_tallied(input, coll)?;
        Ok((out, crate::metrics::CollectMetrics::from_tally(self.mode, tally)))
    }

    pub(crate) fn run_tallied<T, I, C>(
        &self,
        input: I,
        coll: &C,
    ) -> Result<(C::Out, Tally), ReductionError>
    where
        I: IntoIterator<Item = T>,
        T: Send,
        C: Collector<T> + ?Sized,
    {
        let start = Instant::now();
        let (out, mut tally) = match self.mode {
            ExecMode::Sequential => exec_seq(input, coll)?,
            ExecMode::Parallel {
                threads,
                partitions,
            } => {
                let parts = partitions.unwrap_or(self.default_partitions);
                let rows: Vec<T> = input.into_iter().collect();
                let (acc, tally) = match threads {
                    Some(t) => {
                        let pool = rayon::ThreadPoolBuilder::new()
                            .num_threads(t)
                            .build()
                            .inspect_err(|e| tracing::warn!(threads = t, "cannot build worker pool: {e}"))?;
                        pool.install(|| exec_parallel(rows, coll, parts, self.fanout))?
                    }
                    None => exec_parallel(rows, coll, parts, self.fanout)?,
                };
                (coll.finish(acc).map_err(ReductionError::finish)?, tally)
            }
        };
        tally.elapsed = start.elapsed();
        tracing::debug!(
            partitions = tally.partitions,
            elements = tally.elements,
            merges = tally.merges,
            elapsed_us = tally.elapsed.as_micros() as u64,
            "collect finished"
        );
        Ok((out, tally))
    }
}

/// Sequentially collect `input`. `merge` is never called.
pub fn collect<T, I, C>(input: I, coll: &C) -> Result<C::Out, ReductionError>
where
    I: IntoIterator<Item = T>,
    T: Send,
    C: Collector<T> + ?Sized,
{
    Runner::sequential().run(input, coll)
}

/// Collect `input` split into up to `partitions` partitions on the global rayon pool.
pub fn collect_par<T, I, C>(input: I, coll: &C, partitions: usize) -> Result<C::Out, ReductionError>
where
    I: IntoIterator<Item = T>,
    T: Send,
    C: Collector<T> + ?Sized,
{
    Runner::parallel(None, Some(partitions)).run(input, coll)
}

/// Sequential executor (single partition, in order)
fn exec_seq<T, I, C>(input: I, coll: &C) -> Result<(C::Out, Tally), ReductionError>
where
    I: IntoIterator<Item = T>,
    C: Collector<T> + ?Sized,
{
    tracing::debug!("collect (sequential)");
    let acc = coll.create().map_err(ReductionError::create)?;
    let (acc, elements) = fold_partition(0, input, coll, acc)?;
    let out = coll.finish(acc).map_err(ReductionError::finish)?;
    Ok((
        out,
        Tally {
            partitions: 1,
            elements,
            ..Default::default()
        },
    ))
}

/// Parallel executor (split source → fold each partition → ordered merge).
///
/// Returns the merged, unfinished container so the caller can finish it off the pool.
fn exec_parallel<T, C>(
    rows: Vec<T>,
    coll: &C,
    partitions: usize,
    fanout: Option<usize>,
) -> Result<(C::Acc, Tally), ReductionError>
where
    T: Send,
    C: Collector<T> + ?Sized,
{
    let chunks = split_vec(rows, partitions);
    let n = chunks.len();
    tracing::debug!(partitions = n, "collect (parallel)");

    let root = coll.create().map_err(ReductionError::create)?;

    // Shared container: every partition writes through its own handle, no merge.
    if coll.share(&root).is_some() {
        let mut work = Vec::with_capacity(n);
        for (i, rows) in chunks.into_iter().enumerate() {
            let handle = coll.share(&root).ok_or_else(|| {
                ReductionError::create(anyhow!("collector stopped sharing its container"))
            })?;
            work.push((i, rows, handle));
        }
        let counts = work
            .into_par_iter()
            .map(|(i, rows, handle)| fold_partition(i, rows, coll, handle).map(|(_, seen)| seen))
            .collect::<Result<Vec<usize>, ReductionError>>()?;
        let tally = Tally {
            partitions: n,
            elements: counts.iter().sum(),
            ..Default::default()
        };
        return Ok((root, tally));
    }

    if n == 1 {
        let rows = chunks.into_iter().flatten();
        let (acc, elements) = fold_partition(0, rows, coll, root)?;
        let tally = Tally {
            partitions: 1,
            elements,
            ..Default::default()
        };
        return Ok((acc, tally));
    }

    // Partition 0 reuses the container created above.
    let mut seed = Some(root);
    let work: Vec<(usize, Vec<T>, Option<C::Acc>)> = chunks
        .into_iter()
        .enumerate()
        .map(|(i, rows)| (i, rows, seed.take()))
        .collect();

    let partials = work
        .into_par_iter()
        .map(|(i, rows, seed)| {
            let acc = match seed {
                Some(acc) => acc,
                None => coll.create().map_err(ReductionError::create)?,
            };
            fold_partition(i, rows, coll, acc)
        })
        .collect::<Result<Vec<(C::Acc, usize)>, ReductionError>>()?;

    let elements = partials.iter().map(|(_, seen)| seen).sum();
    let accs: Vec<C::Acc> = partials.into_iter().map(|(acc, _)| acc).collect();
    let merges = accs.len().saturating_sub(1);
    let acc = merge_partials::<T, C>(coll, accs, fanout)?;
    let tally = Tally {
        partitions: n,
        elements,
        merges,
        ..Default::default()
    };
    Ok((acc, tally))
}

fn fold_partition<T, I, C>(
    index: usize,
    rows: I,
    coll: &C,
    mut acc: C::Acc,
) -> Result<(C::Acc, usize), ReductionError>
where
    I: IntoIterator<Item = T>,
    C: Collector<T> + ?Sized,
{
    let mut seen = 0usize;
    for v in rows {
        coll.add_input(&mut acc, v)
            .map_err(|e| ReductionError::accumulate(index, e))?;
        seen += 1;
    }
    tracing::trace!(partition = index, elements = seen, "partition folded");
    Ok((acc, seen))
}

/// Merge partial containers in index order. With a fanout, neighbouring groups
/// of at most `fanout` containers are merged per round, groups in parallel.
fn merge_partials<T, C>(
    coll: &C,
    parts: Vec<C::Acc>,
    fanout: Option<usize>,
) -> Result<C::Acc, ReductionError>
where
    C: Collector<T> + ?Sized,
{
    let mut level = parts;
    if let Some(f) = fanout.filter(|f| *f >= 2) {
        while level.len() > f {
            let groups = chunk_owned(level, f);
            level = groups
                .into_par_iter()
                .map(|group| fold_left::<T, C>(coll, group))
                .collect::<Result<Vec<Option<C::Acc>>, ReductionError>>()?
                .into_iter()
                .flatten()
                .collect();
        }
    }
    match fold_left::<T, C>(coll, level)? {
        Some(acc) => Ok(acc),
        None => coll.create().map_err(ReductionError::create),
    }
}

fn fold_left<T, C>(coll: &C, group: Vec<C::Acc>) -> Result<Option<C::Acc>, ReductionError>
where
    C: Collector<T> + ?Sized,
{
    let mut it = group.into_iter();
    let Some(mut acc) = it.next() else {
        return Ok(None);
    };
    for other in it {
        coll.merge(&mut acc, other).map_err(ReductionError::merge)?;
    }
    Ok(Some(acc))
}

/// Split into `n` contiguous chunks whose sizes differ by at most one.
fn split_vec<T>(v: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let len = v.len();
    let n = n.max(1).min(len.max(1));
    if n == 1 {
        return vec![v];
    }
    let (base, extra) = (len / n, len % n);
    let mut rows = v.into_iter();
    (0..n)
        .map(|i| rows.by_ref().take(base + usize::from(i < extra)).collect())
        .collect()
}

fn chunk_owned<A>(v: Vec<A>, size: usize) -> Vec<Vec<A>> {
    let mut out = Vec::with_capacity(v.len().div_ceil(size));
    let mut it = v.into_iter().peekable();
    while it.peek().is_some() {
        out.push(it.by_ref().take(size).collect());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_balanced_and_contiguous() {
        let parts = split_vec((0..10).collect::<Vec<u32>>(), 4);
        let sizes: Vec<usize> = parts.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(parts.concat(), (0..10).collect::<Vec<u32>>());
    }

    #[test]
    fn split_never_exceeds_length() {
        assert_eq!(split_vec(vec![1u8, 2], 8).len(), 2);
        assert_eq!(split_vec(Vec::<u8>::new(), 8), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn chunk_owned_keeps_order() {
        let groups = chunk_owned(vec![1, 2, 3, 4, 5], 2);
        assert_eq!(groups, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }
}

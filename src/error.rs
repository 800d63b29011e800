//! Error types surfaced by the engine and the map aggregator.
//!
//! User closures report failures with [`anyhow::Result`]. The engine classifies
//! them by the stage that failed and wraps them in [`ReductionError`]; the map
//! aggregator wraps them in [`AggregationError`]. The original failure stays
//! reachable through [`std::error::Error::source`] and through `cause()`, which
//! also allows downcasting to the collector's own error type.
//!
//! Running a collector whose `merge` is not associative (or, with a
//! non-deterministic merge order, not commutative) under parallel execution is a
//! contract violation that cannot be detected at runtime. It is the caller's
//! responsibility and never reported as an error.

use thiserror::Error as ThisError;

/// Failure of a whole `collect` run. No partial result is ever returned.
#[derive(Debug, ThisError)]
pub enum ReductionError {
    #[error("container creation failed: {source}")]
    Create { source: anyhow::Error },

    #[error("accumulation failed in partition {partition}: {source}")]
    Accumulate { partition: usize, source: anyhow::Error },

    #[error("merging partial containers failed: {source}")]
    Merge { source: anyhow::Error },

    #[error("finishing the container failed: {source}")]
    Finish { source: anyhow::Error },

    #[error("worker pool could not be built: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl ReductionError {
    pub(crate) fn create(err: anyhow::Error) -> Self {
        Self::Create { source: err }
    }

    pub(crate) fn accumulate(partition: usize, err: anyhow::Error) -> Self {
        Self::Accumulate {
            partition,
            source: err,
        }
    }

    pub(crate) fn merge(err: anyhow::Error) -> Self {
        Self::Merge { source: err }
    }

    pub(crate) fn finish(err: anyhow::Error) -> Self {
        Self::Finish { source: err }
    }

    /// The failure reported by the collector, if the run got that far.
    pub fn cause(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Create { source }
            | Self::Accumulate { source, .. }
            | Self::Merge { source }
            | Self::Finish { source } => Some(source),
            Self::Pool(_) => None,
        }
    }
}

/// Failure of a single `merge` / `compute_if_absent` call.
///
/// The failing key keeps its pre-call state; other keys are unaffected.
#[derive(Debug, ThisError)]
pub enum AggregationError {
    #[error("merge combiner failed: {source}")]
    Combiner { source: anyhow::Error },

    #[error("value factory failed: {source}")]
    Factory { source: anyhow::Error },
}

impl AggregationError {
    pub(crate) fn combiner(err: anyhow::Error) -> Self {
        Self::Combiner { source: err }
    }

    pub(crate) fn factory(err: anyhow::Error) -> Self {
        Self::Factory { source: err }
    }

    pub fn cause(&self) -> &anyhow::Error {
        match self {
            Self::Combiner { source } | Self::Factory { source } => source,
        }
    }
}

/// Error raised by the to-map collectors when two elements map to the same key
/// and no merge function was given.
#[derive(Debug, ThisError)]
#[error("duplicate key {key}")]
pub struct DuplicateKey {
    pub key: String,
}

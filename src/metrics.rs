//! Run metrics for a single `collect`.
//!
//! [`Runner::run_with_metrics`](crate::Runner::run_with_metrics) returns a
//! [`CollectMetrics`] next to the result. Metrics serialize to JSON so they can
//! be logged or attached to other job output.
//!
//! # Example
//!
//! ```
//! use ironcollect::*;
//!
//! let (n, m) = Runner::parallel(None, Some(4)).run_with_metrics(0..100u32, &Count)?;
//! assert_eq!(n, 100);
//! assert_eq!(m.elements, 100);
//! assert_eq!(m.partitions, 4);
//! assert_eq!(m.merges, 3);
//! println!("{}", m.to_json()?);
//! # anyhow::Result::<()>::Ok(())
//! ```

use crate::runner::{ExecMode, Tally};
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};

/// What one run did.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CollectMetrics {
    pub mode: ExecMode,
    /// Partitions actually folded (1 in sequential mode).
    pub partitions: usize,
    /// Elements drained from the sequence.
    pub elements: usize,
    /// `merge` calls made on partial containers.
    pub merges: usize,
    pub elapsed_ms: f64,
}

impl CollectMetrics {
    pub(crate) fn from_tally(mode: ExecMode, tally: Tally) -> Self {
        Self {
            mode,
            partitions: tally.partitions,
            elements: tally.elements,
            merges: tally.merges,
            elapsed_ms: tally.elapsed.as_secs_f64() * 1000.0,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "mode": self.mode,
            "partitions": self.partitions,
            "elements": self.elements,
            "merges": self.merges,
            "elapsed_ms": self.elapsed_ms,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

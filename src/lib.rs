//! # Ironcollect
//!
//! A **mutable-reduction engine** for Rust: describe how elements fold into a
//! container once, then run that description sequentially or split across a
//! rayon worker pool, and compose it with grouping, mapping, counting and
//! partitioning collectors.
//!
//! ## Key Features
//!
//! - **Collector protocol** - `create` / `add_input` / `merge` / `finish`, fallible at every step
//! - **Sequential and parallel execution** - contiguous partitions, merged in partition order
//! - **Composable collectors** - grouping (hashed, ordered, concurrent), partitioning, mapping,
//!   filtering, counting, to-set, to-map, joining, summary statistics
//! - **Incremental aggregation** - `merge` and `compute_if_absent` over any keyed map
//! - **Run metrics** - partitions, elements and merges per run, serialisable to JSON
//!
//! ## Quick Start
//!
//! ```
//! use ironcollect::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let words = vec!["a", "bb", "a", "c", "bb", "bb"];
//!
//! // Same result in both modes.
//! let seq = collect(words.clone(), &grouping_by(|w: &&str| w.to_string(), Count))?;
//! let par = collect_par(words, &grouping_by(|w: &&str| w.to_string(), Count), 3)?;
//! assert_eq!(seq, par);
//! assert_eq!(seq["bb"], 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Collector
//!
//! A [`Collector<T>`] owns no data; it describes a container type and the four
//! operations over it. Closures become a collector through [`collector`] and
//! [`try_collector`]. `merge` must be associative for parallel runs to match
//! sequential ones; that is the caller's obligation and is not checked.
//!
//! ### Runner
//!
//! A [`Runner`] picks the [`ExecMode`]. Sequential runs never call `merge`, and
//! neither does a parallel run that ends up with one partition. Failures abort
//! the whole run with a [`ReductionError`] naming the stage (and partition).
//!
//! ### Downstream collectors
//!
//! [`grouping_by`] and [`partitioning_by`] take a downstream collector applied
//! to each group. A grouping is itself a collector, so groupings nest:
//!
//! ```
//! use ironcollect::*;
//!
//! let people = vec![("ann", 'F', 31), ("bob", 'M', 17), ("cid", 'M', 45)];
//! let by_sex_then_adult = collect(
//!     people,
//!     &grouping_by_ordered(|p: &(&str, char, u32)| p.1, partitioning_by(|p: &(&str, char, u32)| p.2 >= 18, Count)),
//! )?;
//! assert_eq!(*by_sex_then_adult[&'M'].get(true), 1);
//! assert_eq!(*by_sex_then_adult[&'F'].get(false), 0);
//! # Ok::<_, ironcollect::ReductionError>(())
//! ```
//!
//! ### Aggregation
//!
//! [`aggregate`] updates a map one entry at a time; see
//! [`ConcurrentAggregator`] for the thread-safe form.
//!
//! ## Feature Flags
//!
//! - `concurrent` (default) - [`grouping_by_concurrent`], [`to_concurrent_map`] and
//!   [`ConcurrentAggregator`], backed by `dashmap` and `parking_lot`
//! - `metrics` (default) - [`Runner::run_with_metrics`] and [`CollectMetrics`]
//!
//! ## Logging
//!
//! Runs emit `tracing` events (`debug` per run, `trace` per partition). Install
//! any subscriber to see them.

pub mod aggregate;
pub mod collector;
pub mod collectors;
pub mod error;
pub mod keyed;
pub mod runner;
pub mod stream;
pub mod testing;

#[cfg(feature = "metrics")]
pub mod metrics;

// General re-exports
pub use collector::{collector, try_collector, Collector, FnCollector};
pub use collectors::*;
pub use error::{AggregationError, DuplicateKey, ReductionError};
pub use keyed::{Hashed, KeyedStore, MapKind, Ordered};
pub use runner::{collect, collect_par, ExecMode, Runner};
pub use stream::{from_iter, from_vec, Stream};

// Gated re-exports
#[cfg(feature = "concurrent")]
pub use aggregate::ConcurrentAggregator;

#[cfg(feature = "metrics")]
pub use metrics::CollectMetrics;

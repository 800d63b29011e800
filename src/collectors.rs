//! Ready-made collectors and the combinators that compose them.
//!
//! ## Leaf collectors
//! - [`Count`], [`Sum`], [`Min`], [`Max`]
//! - [`ToVec`] (encounter order), [`ToSet`] (union on merge), [`Joining`]
//! - [`AverageF64`], [`SummaryStatistics`]
//! - [`to_map`] / [`to_map_merging`]
//!
//! ## Downstream composition
//! - [`mapping`], [`flat_mapping`], [`filtering`]
//! - [`collecting_and_then`], [`try_collecting_and_then`]
//!
//! ## Keyed
//! - [`grouping_by`] / [`grouping_by_ordered`] / [`grouping_by_with`] / [`group_by`]
//! - [`partitioning_by`]
//! - [`grouping_by_concurrent`], [`to_concurrent_map`] (feature `concurrent`)
//!
//! ```
//! use ironcollect::*;
//!
//! let words = ["a", "bb", "a", "c", "bb", "bb"];
//! let counts = collect(words, &grouping_by(|w: &&str| w.to_string(), Count))?;
//! assert_eq!(counts["bb"], 3);
//! # Ok::<_, ironcollect::ReductionError>(())
//! ```

mod adapters;
mod basic;
mod grouping;
mod statistical;
mod to_map;

#[cfg(feature = "concurrent")]
mod concurrent;

pub use adapters::*;
pub use basic::*;
pub use grouping::*;
pub use statistical::*;
pub use to_map::*;

#[cfg(feature = "concurrent")]
pub use concurrent::*;

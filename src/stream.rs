//! A lazy element sequence with collector-driven terminal operations.
//!
//! `Stream` is a thin wrapper over an iterator: the intermediate operations
//! ([`map`](Stream::map), [`filter`](Stream::filter), ...) build up the
//! iterator chain without running it, and the terminal `collect_*` calls hand
//! the sequence to a [`Runner`].
//!
//! ```
//! use ironcollect::*;
//!
//! let long = from_vec(vec!["one", "two", "three", "four"])
//!     .filter(|s| s.len() > 3)
//!     .map(str::to_uppercase)
//!     .collect_seq(&to_vec())?;
//! assert_eq!(long, vec!["THREE", "FOUR"]);
//! # Ok::<_, ironcollect::ReductionError>(())
//! ```

use crate::collector::Collector;
use crate::error::ReductionError;
use crate::runner::Runner;
use std::iter::{Filter, FlatMap, Inspect, Map};

/// Lazy, single-use sequence of elements.
#[derive(Clone, Debug)]
#[must_use = "streams do nothing until collected"]
pub struct Stream<I> {
    iter: I,
}

/// Stream over an owned vector.
pub fn from_vec<T>(data: Vec<T>) -> Stream<std::vec::IntoIter<T>> {
    Stream {
        iter: data.into_iter(),
    }
}

/// Stream over any iterable.
pub fn from_iter<I: IntoIterator>(iter: I) -> Stream<I::IntoIter> {
    Stream {
        iter: iter.into_iter(),
    }
}

impl<I: Iterator> Stream<I> {
    pub fn map<O, F>(self, f: F) -> Stream<Map<I, F>>
    where
        F: FnMut(I::Item) -> O,
    {
        Stream {
            iter: self.iter.map(f),
        }
    }

    pub fn filter<P>(self, pred: P) -> Stream<Filter<I, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Stream {
            iter: self.iter.filter(pred),
        }
    }

    pub fn flat_map<U, F>(self, f: F) -> Stream<FlatMap<I, U, F>>
    where
        U: IntoIterator,
        F: FnMut(I::Item) -> U,
    {
        Stream {
            iter: self.iter.flat_map(f),
        }
    }

    /// Observe each element as it flows past (`peek`).
    pub fn inspect<F>(self, f: F) -> Stream<Inspect<I, F>>
    where
        F: FnMut(&I::Item),
    {
        Stream {
            iter: self.iter.inspect(f),
        }
    }

    /// Collect in encounter order on the calling thread.
    pub fn collect_seq<C>(self, coll: &C) -> Result<C::Out, ReductionError>
    where
        I::Item: Send,
        C: Collector<I::Item> + ?Sized,
    {
        Runner::sequential().run(self.iter, coll)
    }

    /// Collect on a worker pool. `threads` picks a dedicated pool size,
    /// `partitions` the partition count; `None` uses the runner defaults.
    pub fn collect_par<C>(
        self,
        coll: &C,
        threads: Option<usize>,
        partitions: Option<usize>,
    ) -> Result<C::Out, ReductionError>
    where
        I::Item: Send,
        C: Collector<I::Item> + ?Sized,
    {
        Runner::parallel(threads, partitions).run(self.iter, coll)
    }

    pub fn collect_with<C>(self, runner: &Runner, coll: &C) -> Result<C::Out, ReductionError>
    where
        I::Item: Send,
        C: Collector<I::Item> + ?Sized,
    {
        runner.run(self.iter, coll)
    }

    pub fn into_inner(self) -> I {
        self.iter
    }
}

impl<I: Iterator> IntoIterator for Stream<I> {
    type Item = I::Item;
    type IntoIter = I;

    fn into_iter(self) -> I {
        self.iter
    }
}

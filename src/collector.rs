//! The collector protocol and closure-built collectors.
//!
//! A [`Collector`] describes how a sequence of `T` folds into a mutable
//! container (`Acc`) and how that container becomes the result (`Out`):
//!
//! - [`create`](Collector::create) -- a fresh, empty container
//! - [`add_input`](Collector::add_input) -- fold one element into a container
//! - [`merge`](Collector::merge) -- fold a second container into the first
//! - [`finish`](Collector::finish) -- turn the container into the result
//!
//! Every method is fallible with [`anyhow::Result`]; the [`Runner`](crate::Runner)
//! classifies failures into [`ReductionError`](crate::ReductionError).
//!
//! # Associativity
//!
//! `merge` must be associative: folding `xs` and `ys` into two containers and
//! merging them has to give the same container as folding `xs ++ ys` into one.
//! Parallel runs rely on it. Nothing checks it.
//!
//! # Example
//! ```
//! use ironcollect::*;
//!
//! let joined = collector(String::new, |acc: &mut String, c: char| acc.push(c), |a, b| a.push_str(&b));
//! let out = from_iter("abc".chars()).collect_seq(&joined)?;
//! assert_eq!(out, "abc");
//! # Ok::<_, ironcollect::ReductionError>(())
//! ```

use anyhow::Result;
use std::marker::PhantomData;

/// A mutable-reduction strategy over elements of type `T`.
pub trait Collector<T>: Send + Sync {
    /// Intermediate mutable container.
    type Acc: Send;
    /// Final result.
    type Out;

    fn create(&self) -> Result<Self::Acc>;

    fn add_input(&self, acc: &mut Self::Acc, v: T) -> Result<()>;

    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc) -> Result<()>;

    fn finish(&self, acc: Self::Acc) -> Result<Self::Out>;

    /// Hand out another handle to a shared container.
    ///
    /// Collectors whose container is safe to write from several partitions at
    /// once return `Some`; the runner then creates a single container and lets
    /// every partition accumulate through its own handle, skipping `merge`.
    fn share(&self, _acc: &Self::Acc) -> Option<Self::Acc> {
        None
    }
}

impl<T, C> Collector<T> for &C
where
    C: Collector<T> + ?Sized,
{
    type Acc = C::Acc;
    type Out = C::Out;

    fn create(&self) -> Result<Self::Acc> {
        (**self).create()
    }

    fn add_input(&self, acc: &mut Self::Acc, v: T) -> Result<()> {
        (**self).add_input(acc, v)
    }

    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc) -> Result<()> {
        (**self).merge(acc, other)
    }

    fn finish(&self, acc: Self::Acc) -> Result<Self::Out> {
        (**self).finish(acc)
    }

    fn share(&self, acc: &Self::Acc) -> Option<Self::Acc> {
        (**self).share(acc)
    }
}

/// Collector built from three fallible closures. Finishing is the identity.
///
/// Built by [`collector`] or [`try_collector`].
pub struct FnCollector<T, A, S, F, M> {
    supplier: S,
    accumulator: F,
    combiner: M,
    _m: PhantomData<fn(T) -> A>,
}

impl<T, A, S, F, M> Collector<T> for FnCollector<T, A, S, F, M>
where
    A: Send,
    S: Fn() -> Result<A> + Send + Sync,
    F: Fn(&mut A, T) -> Result<()> + Send + Sync,
    M: Fn(&mut A, A) -> Result<()> + Send + Sync,
{
    type Acc = A;
    type Out = A;

    fn create(&self) -> Result<A> {
        (self.supplier)()
    }

    fn add_input(&self, acc: &mut A, v: T) -> Result<()> {
        (self.accumulator)(acc, v)
    }

    fn merge(&self, acc: &mut A, other: A) -> Result<()> {
        (self.combiner)(acc, other)
    }

    fn finish(&self, acc: A) -> Result<A> {
        Ok(acc)
    }
}

/// Build a collector from a supplier, an accumulator and a combiner.
///
/// The accumulator mutates the container in place; to replace the container
/// wholesale, assign through the `&mut` (`*acc = new_container`).
pub fn collector<T, A, S, F, M>(
    supplier: S,
    accumulator: F,
    combiner: M,
) -> impl Collector<T, Acc = A, Out = A>
where
    A: Send,
    S: Fn() -> A + Send + Sync,
    F: Fn(&mut A, T) + Send + Sync,
    M: Fn(&mut A, A) + Send + Sync,
{
    try_collector(
        move || Ok(supplier()),
        move |acc: &mut A, v: T| {
            accumulator(acc, v);
            Ok(())
        },
        move |acc: &mut A, other: A| {
            combiner(acc, other);
            Ok(())
        },
    )
}

/// Like [`collector`], with closures that may fail.
pub fn try_collector<T, A, S, F, M>(
    supplier: S,
    accumulator: F,
    combiner: M,
) -> FnCollector<T, A, S, F, M>
where
    A: Send,
    S: Fn() -> Result<A> + Send + Sync,
    F: Fn(&mut A, T) -> Result<()> + Send + Sync,
    M: Fn(&mut A, A) -> Result<()> + Send + Sync,
{
    FnCollector {
        supplier,
        accumulator,
        combiner,
        _m: PhantomData,
    }
}

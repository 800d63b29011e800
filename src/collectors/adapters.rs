//! Downstream adapters: mapping, flat-mapping, filtering and finishing.
//!
//! Each adapter wraps an inner collector and keeps its container, so the
//! associativity of the inner `merge` carries over unchanged.

use crate::collector::Collector;
use anyhow::Result;

/// Applies a function to every element before the inner collector sees it.
#[derive(Clone, Copy, Debug)]
pub struct Mapping<F, C> {
    f: F,
    inner: C,
}

/// `mapping(f, downstream)`: collect `f(x)` instead of `x`.
pub fn mapping<F, C>(f: F, downstream: C) -> Mapping<F, C> {
    Mapping {
        f,
        inner: downstream,
    }
}

impl<T, U, F, C> Collector<T> for Mapping<F, C>
where
    F: Fn(T) -> U + Send + Sync,
    C: Collector<U>,
{
    type Acc = C::Acc;
    type Out = C::Out;

    fn create(&self) -> Result<C::Acc> {
        self.inner.create()
    }

    fn add_input(&self, acc: &mut C::Acc, v: T) -> Result<()> {
        self.inner.add_input(acc, (self.f)(v))
    }

    fn merge(&self, acc: &mut C::Acc, other: C::Acc) -> Result<()> {
        self.inner.merge(acc, other)
    }

    fn finish(&self, acc: C::Acc) -> Result<C::Out> {
        self.inner.finish(acc)
    }

    fn share(&self, acc: &C::Acc) -> Option<C::Acc> {
        self.inner.share(acc)
    }
}

/// Expands every element into zero or more elements for the inner collector.
#[derive(Clone, Copy, Debug)]
pub struct FlatMapping<F, C> {
    f: F,
    inner: C,
}

pub fn flat_mapping<F, C>(f: F, downstream: C) -> FlatMapping<F, C> {
    FlatMapping {
        f,
        inner: downstream,
    }
}

impl<T, I, F, C> Collector<T> for FlatMapping<F, C>
where
    F: Fn(T) -> I + Send + Sync,
    I: IntoIterator,
    C: Collector<I::Item>,
{
    type Acc = C::Acc;
    type Out = C::Out;

    fn create(&self) -> Result<C::Acc> {
        self.inner.create()
    }

    fn add_input(&self, acc: &mut C::Acc, v: T) -> Result<()> {
        for u in (self.f)(v) {
            self.inner.add_input(acc, u)?;
        }
        Ok(())
    }

    fn merge(&self, acc: &mut C::Acc, other: C::Acc) -> Result<()> {
        self.inner.merge(acc, other)
    }

    fn finish(&self, acc: C::Acc) -> Result<C::Out> {
        self.inner.finish(acc)
    }

    fn share(&self, acc: &C::Acc) -> Option<C::Acc> {
        self.inner.share(acc)
    }
}

/// Drops elements failing a predicate before the inner collector sees them.
#[derive(Clone, Copy, Debug)]
pub struct Filtering<P, C> {
    pred: P,
    inner: C,
}

pub fn filtering<P, C>(pred: P, downstream: C) -> Filtering<P, C> {
    Filtering {
        pred,
        inner: downstream,
    }
}

impl<T, P, C> Collector<T> for Filtering<P, C>
where
    P: Fn(&T) -> bool + Send + Sync,
    C: Collector<T>,
{
    type Acc = C::Acc;
    type Out = C::Out;

    fn create(&self) -> Result<C::Acc> {
        self.inner.create()
    }

    fn add_input(&self, acc: &mut C::Acc, v: T) -> Result<()> {
        if (self.pred)(&v) {
            self.inner.add_input(acc, v)
        } else {
            Ok(())
        }
    }

    fn merge(&self, acc: &mut C::Acc, other: C::Acc) -> Result<()> {
        self.inner.merge(acc, other)
    }

    fn finish(&self, acc: C::Acc) -> Result<C::Out> {
        self.inner.finish(acc)
    }

    fn share(&self, acc: &C::Acc) -> Option<C::Acc> {
        self.inner.share(acc)
    }
}

/// Runs a finisher over the inner collector's result.
#[derive(Clone, Copy, Debug)]
pub struct AndThen<C, F> {
    inner: C,
    f: F,
}

/// `collecting_and_then(downstream, f)`: collect, then map the result with `f`.
pub fn collecting_and_then<C, F>(downstream: C, f: F) -> AndThen<C, F> {
    AndThen {
        inner: downstream,
        f,
    }
}

impl<T, R, C, F> Collector<T> for AndThen<C, F>
where
    C: Collector<T>,
    F: Fn(C::Out) -> R + Send + Sync,
{
    type Acc = C::Acc;
    type Out = R;

    fn create(&self) -> Result<C::Acc> {
        self.inner.create()
    }

    fn add_input(&self, acc: &mut C::Acc, v: T) -> Result<()> {
        self.inner.add_input(acc, v)
    }

    fn merge(&self, acc: &mut C::Acc, other: C::Acc) -> Result<()> {
        self.inner.merge(acc, other)
    }

    fn finish(&self, acc: C::Acc) -> Result<R> {
        Ok((self.f)(self.inner.finish(acc)?))
    }

    fn share(&self, acc: &C::Acc) -> Option<C::Acc> {
        self.inner.share(acc)
    }
}

/// Like [`AndThen`], with a finisher that may fail.
#[derive(Clone, Copy, Debug)]
pub struct TryAndThen<C, F> {
    inner: C,
    f: F,
}

pub fn try_collecting_and_then<C, F>(downstream: C, f: F) -> TryAndThen<C, F> {
    TryAndThen {
        inner: downstream,
        f,
    }
}

impl<T, R, C, F> Collector<T> for TryAndThen<C, F>
where
    C: Collector<T>,
    F: Fn(C::Out) -> Result<R> + Send + Sync,
{
    type Acc = C::Acc;
    type Out = R;

    fn create(&self) -> Result<C::Acc> {
        self.inner.create()
    }

    fn add_input(&self, acc: &mut C::Acc, v: T) -> Result<()> {
        self.inner.add_input(acc, v)
    }

    fn merge(&self, acc: &mut C::Acc, other: C::Acc) -> Result<()> {
        self.inner.merge(acc, other)
    }

    fn finish(&self, acc: C::Acc) -> Result<R> {
        (self.f)(self.inner.finish(acc)?)
    }

    fn share(&self, acc: &C::Acc) -> Option<C::Acc> {
        self.inner.share(acc)
    }
}

//! Grouping-by-key and partitioning-by-predicate.
//!
//! A grouping is itself a collector, so it can be the downstream of another
//! grouping; that is all multi-level grouping takes.

use crate::collector::Collector;
use crate::collectors::basic::ToVec;
use crate::keyed::{Hashed, KeyedStore, MapKind, Ordered};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;

/* ===================== GroupingBy ===================== */

/// Groups elements by `key_fn` and folds each group with `downstream`.
///
/// - Container: `M::Map<D::Acc>` (one downstream container per key, created lazily)
/// - Output: `M::Map<D::Out>`
pub struct GroupingBy<F, D, K, M = Hashed> {
    key_fn: F,
    downstream: D,
    _m: PhantomData<fn() -> (K, M)>,
}

/// Group into a `HashMap<K, D::Out>`.
pub fn grouping_by<T, K, F, D>(key_fn: F, downstream: D) -> GroupingBy<F, D, K, Hashed>
where
    F: Fn(&T) -> K,
{
    grouping_by_with(key_fn, downstream)
}

/// Group into a `BTreeMap<K, D::Out>` (iteration in key order).
pub fn grouping_by_ordered<T, K, F, D>(key_fn: F, downstream: D) -> GroupingBy<F, D, K, Ordered>
where
    F: Fn(&T) -> K,
{
    grouping_by_with(key_fn, downstream)
}

/// Group into the map picked by `M`.
pub fn grouping_by_with<T, K, M, F, D>(key_fn: F, downstream: D) -> GroupingBy<F, D, K, M>
where
    F: Fn(&T) -> K,
{
    GroupingBy {
        key_fn,
        downstream,
        _m: PhantomData,
    }
}

/// Group elements into `HashMap<K, Vec<T>>`, keeping encounter order per key.
pub fn group_by<T, K, F>(key_fn: F) -> GroupingBy<F, ToVec<T>, K, Hashed>
where
    F: Fn(&T) -> K,
{
    grouping_by_with(key_fn, ToVec(PhantomData))
}

impl<T, K, F, D, M> Collector<T> for GroupingBy<F, D, K, M>
where
    F: Fn(&T) -> K + Send + Sync,
    D: Collector<T>,
    M: MapKind<K>,
    M::Map<D::Acc>: Send,
{
    type Acc = M::Map<D::Acc>;
    type Out = M::Map<D::Out>;

    fn create(&self) -> Result<Self::Acc> {
        Ok(Default::default())
    }

    fn add_input(&self, acc: &mut Self::Acc, v: T) -> Result<()> {
        let key = (self.key_fn)(&v);
        let slot = acc.try_get_or_insert_with(key, |_| self.downstream.create())?;
        self.downstream.add_input(slot, v)
    }

    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc) -> Result<()> {
        for (key, theirs) in other {
            if let Some(mine) = acc.get_mut(&key) {
                self.downstream.merge(mine, theirs)?;
            } else {
                acc.put(key, theirs);
            }
        }
        Ok(())
    }

    fn finish(&self, acc: Self::Acc) -> Result<Self::Out> {
        let mut out: Self::Out = Default::default();
        for (key, a) in acc {
            out.put(key, self.downstream.finish(a)?);
        }
        Ok(out)
    }
}

/* ===================== PartitioningBy ===================== */

/// Result of [`partitioning_by`]: both outcomes are always present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Partitioned<O> {
    /// Elements for which the predicate held.
    pub matched: O,
    /// Elements for which it did not.
    pub unmatched: O,
}

impl<O> Partitioned<O> {
    pub fn get(&self, outcome: bool) -> &O {
        if outcome { &self.matched } else { &self.unmatched }
    }

    pub fn get_mut(&mut self, outcome: bool) -> &mut O {
        if outcome {
            &mut self.matched
        } else {
            &mut self.unmatched
        }
    }

    /// Always 2.
    pub fn len(&self) -> usize {
        2
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = (bool, &O)> {
        [(true, &self.matched), (false, &self.unmatched)].into_iter()
    }

    pub fn into_map(self) -> HashMap<bool, O> {
        HashMap::from([(true, self.matched), (false, self.unmatched)])
    }
}

/// Splits elements by a predicate and folds each side with `downstream`.
pub struct PartitioningBy<P, D> {
    pred: P,
    downstream: D,
}

pub fn partitioning_by<P, D>(pred: P, downstream: D) -> PartitioningBy<P, D> {
    PartitioningBy { pred, downstream }
}

impl<T, P, D> Collector<T> for PartitioningBy<P, D>
where
    P: Fn(&T) -> bool + Send + Sync,
    D: Collector<T>,
{
    type Acc = Partitioned<D::Acc>;
    type Out = Partitioned<D::Out>;

    fn create(&self) -> Result<Self::Acc> {
        Ok(Partitioned {
            matched: self.downstream.create()?,
            unmatched: self.downstream.create()?,
        })
    }

    fn add_input(&self, acc: &mut Self::Acc, v: T) -> Result<()> {
        let side = acc.get_mut((self.pred)(&v));
        self.downstream.add_input(side, v)
    }

    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc) -> Result<()> {
        self.downstream.merge(&mut acc.matched, other.matched)?;
        self.downstream.merge(&mut acc.unmatched, other.unmatched)
    }

    fn finish(&self, acc: Self::Acc) -> Result<Self::Out> {
        Ok(Partitioned {
            matched: self.downstream.finish(acc.matched)?,
            unmatched: self.downstream.finish(acc.unmatched)?,
        })
    }
}

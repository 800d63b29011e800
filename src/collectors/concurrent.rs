//! Concurrency-safe collectors backed by [`DashMap`].
//!
//! Their container is an `Arc` around one shared map, so in parallel runs the
//! engine hands every partition a handle to the same map (see
//! [`Collector::share`]) instead of building partial maps and merging them.
//!
//! - New keys are inserted atomically by the map.
//! - Writers to the same key of a grouping are serialised by a per-key
//!   [`parking_lot::Mutex`]; writers to different keys do not contend.

use crate::collector::Collector;
use crate::error::DuplicateKey;
use anyhow::{anyhow, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

type Slot<A> = Arc<Mutex<A>>;

/// Take sole ownership of a shared container once every handle is gone.
fn unshare<M>(acc: Arc<M>) -> Result<M> {
    Arc::try_unwrap(acc).map_err(|_| anyhow!("shared container still has live handles"))
}

/* ===================== GroupingByConcurrent ===================== */

/// Concurrent counterpart of [`GroupingBy`](crate::GroupingBy).
///
/// - Container: `Arc<DashMap<K, Arc<Mutex<D::Acc>>>>`
/// - Output: `DashMap<K, D::Out>`
pub struct GroupingByConcurrent<F, D, K> {
    key_fn: F,
    downstream: D,
    _m: PhantomData<fn() -> K>,
}

pub fn grouping_by_concurrent<T, K, F, D>(key_fn: F, downstream: D) -> GroupingByConcurrent<F, D, K>
where
    F: Fn(&T) -> K,
{
    GroupingByConcurrent {
        key_fn,
        downstream,
        _m: PhantomData,
    }
}

impl<T, K, F, D> Collector<T> for GroupingByConcurrent<F, D, K>
where
    K: Eq + Hash + Send + Sync,
    F: Fn(&T) -> K + Send + Sync,
    D: Collector<T>,
{
    type Acc = Arc<DashMap<K, Slot<D::Acc>>>;
    type Out = DashMap<K, D::Out>;

    fn create(&self) -> Result<Self::Acc> {
        Ok(Arc::new(DashMap::new()))
    }

    fn add_input(&self, acc: &mut Self::Acc, v: T) -> Result<()> {
        let key = (self.key_fn)(&v);
        // Clone the slot out so the shard lock is released before the key lock is taken.
        let found = acc.get(&key).map(|r| Arc::clone(r.value()));
        let slot = match found {
            Some(slot) => slot,
            None => {
                let inserted = acc
                    .entry(key)
                    .or_try_insert_with(|| self.downstream.create().map(|a| Arc::new(Mutex::new(a))))?;
                Arc::clone(inserted.value())
            }
        };
        let mut guard = slot.lock();
        self.downstream.add_input(&mut guard, v)
    }

    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc) -> Result<()> {
        if Arc::ptr_eq(acc, &other) {
            return Ok(());
        }
        for (key, theirs) in unshare(other)? {
            let theirs = unshare(theirs)?.into_inner();
            let mine = match acc.entry(key) {
                Entry::Occupied(o) => Arc::clone(o.get()),
                Entry::Vacant(v) => {
                    v.insert(Arc::new(Mutex::new(theirs)));
                    continue;
                }
            };
            self.downstream.merge(&mut mine.lock(), theirs)?;
        }
        Ok(())
    }

    fn finish(&self, acc: Self::Acc) -> Result<Self::Out> {
        let out = DashMap::new();
        for (key, slot) in unshare(acc)? {
            let a = unshare(slot)?.into_inner();
            out.insert(key, self.downstream.finish(a)?);
        }
        Ok(out)
    }

    fn share(&self, acc: &Self::Acc) -> Option<Self::Acc> {
        Some(Arc::clone(acc))
    }
}

/* ===================== ToConcurrentMap ===================== */

/// Key/value collection into one shared [`DashMap`].
pub struct ToConcurrentMap<KF, VF, MF, K> {
    key_fn: KF,
    value_fn: VF,
    merge_fn: Option<MF>,
    _m: PhantomData<fn() -> K>,
}

/// Collect into a `DashMap<K, V>`; a repeated key is an error.
pub fn to_concurrent_map<T, K, V, KF, VF>(
    key_fn: KF,
    value_fn: VF,
) -> ToConcurrentMap<KF, VF, crate::collectors::MergeFn<V>, K>
where
    KF: Fn(&T) -> K,
    VF: Fn(T) -> V,
{
    ToConcurrentMap {
        key_fn,
        value_fn,
        merge_fn: None,
        _m: PhantomData,
    }
}

/// Collect into a `DashMap<K, V>`, folding colliding values with `merge_fn`.
pub fn to_concurrent_map_merging<T, K, V, KF, VF, MF>(
    key_fn: KF,
    value_fn: VF,
    merge_fn: MF,
) -> ToConcurrentMap<KF, VF, MF, K>
where
    KF: Fn(&T) -> K,
    VF: Fn(T) -> V,
    MF: Fn(&mut V, V),
{
    ToConcurrentMap {
        key_fn,
        value_fn,
        merge_fn: Some(merge_fn),
        _m: PhantomData,
    }
}

impl<KF, VF, MF, K> ToConcurrentMap<KF, VF, MF, K> {
    fn fold_value<V>(&self, map: &DashMap<K, V>, key: K, value: V) -> Result<()>
    where
        K: Eq + Hash + Debug,
        MF: Fn(&mut V, V),
    {
        match map.entry(key) {
            Entry::Occupied(mut o) => match &self.merge_fn {
                Some(f) => {
                    f(o.get_mut(), value);
                    Ok(())
                }
                None => Err(DuplicateKey {
                    key: format!("{:?}", o.key()),
                }
                .into()),
            },
            Entry::Vacant(v) => {
                v.insert(value);
                Ok(())
            }
        }
    }
}

impl<T, K, V, KF, VF, MF> Collector<T> for ToConcurrentMap<KF, VF, MF, K>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Send + Sync,
    KF: Fn(&T) -> K + Send + Sync,
    VF: Fn(T) -> V + Send + Sync,
    MF: Fn(&mut V, V) + Send + Sync,
{
    type Acc = Arc<DashMap<K, V>>;
    type Out = DashMap<K, V>;

    fn create(&self) -> Result<Self::Acc> {
        Ok(Arc::new(DashMap::new()))
    }

    fn add_input(&self, acc: &mut Self::Acc, v: T) -> Result<()> {
        let key = (self.key_fn)(&v);
        let value = (self.value_fn)(v);
        self.fold_value(acc, key, value)
    }

    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc) -> Result<()> {
        if Arc::ptr_eq(acc, &other) {
            return Ok(());
        }
        for (key, value) in unshare(other)? {
            self.fold_value(acc, key, value)?;
        }
        Ok(())
    }

    fn finish(&self, acc: Self::Acc) -> Result<Self::Out> {
        unshare(acc)
    }

    fn share(&self, acc: &Self::Acc) -> Option<Self::Acc> {
        Some(Arc::clone(acc))
    }
}

//! Key/value map collectors.
//!
//! Without a merge function a repeated key fails the collection with
//! [`DuplicateKey`]; with one, the colliding values are folded in place.

use crate::collector::Collector;
use crate::error::DuplicateKey;
use crate::keyed::{Hashed, KeyedStore, MapKind, Ordered};
use anyhow::Result;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Merge function used when keys collide: fold the new value into the stored one.
pub type MergeFn<V> = fn(&mut V, V);

pub struct ToMap<KF, VF, MF, K, M = Hashed> {
    key_fn: KF,
    value_fn: VF,
    merge_fn: Option<MF>,
    _m: PhantomData<fn() -> (K, M)>,
}

/// Collect into `HashMap<K, V>`; a repeated key is an error.
pub fn to_map<T, K, V, KF, VF>(key_fn: KF, value_fn: VF) -> ToMap<KF, VF, MergeFn<V>, K, Hashed>
where
    KF: Fn(&T) -> K,
    VF: Fn(T) -> V,
{
    ToMap {
        key_fn,
        value_fn,
        merge_fn: None,
        _m: PhantomData,
    }
}

/// Collect into `HashMap<K, V>`, folding colliding values with `merge_fn`.
pub fn to_map_merging<T, K, V, KF, VF, MF>(
    key_fn: KF,
    value_fn: VF,
    merge_fn: MF,
) -> ToMap<KF, VF, MF, K, Hashed>
where
    KF: Fn(&T) -> K,
    VF: Fn(T) -> V,
    MF: Fn(&mut V, V),
{
    ToMap {
        key_fn,
        value_fn,
        merge_fn: Some(merge_fn),
        _m: PhantomData,
    }
}

/// Collect into `BTreeMap<K, V>`, folding colliding values with `merge_fn`.
pub fn to_ordered_map_merging<T, K, V, KF, VF, MF>(
    key_fn: KF,
    value_fn: VF,
    merge_fn: MF,
) -> ToMap<KF, VF, MF, K, Ordered>
where
    KF: Fn(&T) -> K,
    VF: Fn(T) -> V,
    MF: Fn(&mut V, V),
{
    ToMap {
        key_fn,
        value_fn,
        merge_fn: Some(merge_fn),
        _m: PhantomData,
    }
}

impl<KF, VF, MF, K, M> ToMap<KF, VF, MF, K, M> {
    fn fold_value<V>(&self, store: &mut M::Map<V>, key: K, value: V) -> Result<()>
    where
        K: Debug,
        M: MapKind<K>,
        MF: Fn(&mut V, V),
    {
        if let Some(stored) = store.get_mut(&key) {
            return match &self.merge_fn {
                Some(f) => {
                    f(stored, value);
                    Ok(())
                }
                None => Err(DuplicateKey {
                    key: format!("{key:?}"),
                }
                .into()),
            };
        }
        store.put(key, value);
        Ok(())
    }
}

impl<T, K, V, KF, VF, MF, M> Collector<T> for ToMap<KF, VF, MF, K, M>
where
    K: Debug,
    KF: Fn(&T) -> K + Send + Sync,
    VF: Fn(T) -> V + Send + Sync,
    MF: Fn(&mut V, V) + Send + Sync,
    M: MapKind<K>,
    M::Map<V>: Send,
{
    type Acc = M::Map<V>;
    type Out = M::Map<V>;

    fn create(&self) -> Result<Self::Acc> {
        Ok(Default::default())
    }

    fn add_input(&self, acc: &mut Self::Acc, v: T) -> Result<()> {
        let key = (self.key_fn)(&v);
        let value = (self.value_fn)(v);
        self.fold_value::<V>(acc, key, value)
    }

    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc) -> Result<()> {
        for (key, value) in other {
            self.fold_value::<V>(acc, key, value)?;
        }
        Ok(())
    }

    fn finish(&self, acc: Self::Acc) -> Result<Self::Out> {
        Ok(acc)
    }
}

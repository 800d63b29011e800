//! Incremental keyed aggregation: `merge` and `compute_if_absent`.
//!
//! The free functions work on any [`KeyedStore`] (`HashMap`, `BTreeMap`).
//! A combiner returning `None` removes the key; that is the only way a merge
//! deletes an entry.
//!
//! ```
//! use ironcollect::aggregate;
//! use std::collections::HashMap;
//!
//! let mut totals: HashMap<&str, i32> = HashMap::new();
//! aggregate::merge(&mut totals, "x", 5, |a, b| Some(a + b));
//! aggregate::merge(&mut totals, "x", 3, |a, b| Some(a + b));
//! assert_eq!(totals["x"], 8);
//!
//! aggregate::merge(&mut totals, "x", 0, |_, _| None);
//! assert!(totals.is_empty());
//! ```
//!
//! With the `concurrent` feature, [`ConcurrentAggregator`] offers the same
//! operations through `&self`, atomically per key.

use crate::error::AggregationError;
use crate::keyed::KeyedStore;

/// Insert `value` under `key`, or replace the stored value with
/// `combiner(&old, value)`.
///
/// Returns the live stored value, or `None` when the combiner removed the key.
/// The store is only written after the combiner returns, so a panicking
/// combiner leaves the key as it was.
pub fn merge<K, V, S, F>(store: &mut S, key: K, value: V, combiner: F) -> Option<&mut V>
where
    S: KeyedStore<K, V>,
    F: FnOnce(&V, V) -> Option<V>,
{
    let next = match store.get(&key) {
        Some(old) => combiner(old, value),
        None => Some(value),
    };
    match next {
        Some(v) => Some(store.put(key, v)),
        None => {
            store.remove(&key);
            None
        }
    }
}

/// Like [`merge`], with a combiner that may fail.
///
/// On failure the key keeps its previous value.
pub fn try_merge<K, V, S, F>(
    store: &mut S,
    key: K,
    value: V,
    combiner: F,
) -> Result<Option<&mut V>, AggregationError>
where
    S: KeyedStore<K, V>,
    F: FnOnce(&V, V) -> anyhow::Result<Option<V>>,
{
    let next = match store.get(&key) {
        Some(old) => combiner(old, value).map_err(AggregationError::combiner)?,
        None => Some(value),
    };
    Ok(match next {
        Some(v) => Some(store.put(key, v)),
        None => {
            store.remove(&key);
            None
        }
    })
}

/// Return the value under `key`, inserting `factory(&key)` first if absent.
///
/// The factory runs at most once and only for a missing key.
pub fn compute_if_absent<K, V, S, F>(store: &mut S, key: K, factory: F) -> &mut V
where
    S: KeyedStore<K, V>,
    F: FnOnce(&K) -> V,
{
    store.get_or_insert_with(key, factory)
}

/// Like [`compute_if_absent`], with a factory that may fail. Nothing is
/// inserted on failure.
pub fn try_compute_if_absent<K, V, S, F>(
    store: &mut S,
    key: K,
    factory: F,
) -> Result<&mut V, AggregationError>
where
    S: KeyedStore<K, V>,
    F: FnOnce(&K) -> anyhow::Result<V>,
{
    store.try_get_or_insert_with(key, |k| factory(k).map_err(AggregationError::factory))
}

#[cfg(feature = "concurrent")]
pub use self::concurrent::ConcurrentAggregator;

#[cfg(feature = "concurrent")]
mod concurrent {
    use crate::error::AggregationError;
    use dashmap::mapref::entry::Entry;
    use dashmap::mapref::one::RefMut;
    use dashmap::DashMap;
    use std::collections::HashMap;
    use std::hash::Hash;

    /// A keyed aggregator safe to update from many threads at once.
    ///
    /// Every operation locks the key's shard for its duration, so combiners and
    /// factories run at most once per call and never interleave on one key.
    /// Returned guards keep that shard locked; drop them before touching
    /// another key of the same aggregator from the same thread.
    #[derive(Debug)]
    pub struct ConcurrentAggregator<K: Eq + Hash, V> {
        map: DashMap<K, V>,
    }

    impl<K: Eq + Hash, V> Default for ConcurrentAggregator<K, V> {
        fn default() -> Self {
            Self {
                map: DashMap::new(),
            }
        }
    }

    impl<K: Eq + Hash, V> From<DashMap<K, V>> for ConcurrentAggregator<K, V> {
        fn from(map: DashMap<K, V>) -> Self {
            Self { map }
        }
    }

    impl<K: Eq + Hash, V> ConcurrentAggregator<K, V> {
        pub fn new() -> Self {
            Self::default()
        }

        /// Insert `value`, or replace the stored value with `combiner(&old, value)`.
        /// `None` from the combiner removes the key.
        pub fn merge<F>(&self, key: K, value: V, combiner: F) -> Option<RefMut<'_, K, V>>
        where
            F: FnOnce(&V, V) -> Option<V>,
        {
            match self.map.entry(key) {
                Entry::Occupied(mut o) => match combiner(o.get(), value) {
                    Some(v) => {
                        o.insert(v);
                        Some(o.into_ref())
                    }
                    None => {
                        o.remove();
                        None
                    }
                },
                Entry::Vacant(slot) => Some(slot.insert(value)),
            }
        }

        pub fn try_merge<F>(
            &self,
            key: K,
            value: V,
            combiner: F,
        ) -> Result<Option<RefMut<'_, K, V>>, AggregationError>
        where
            F: FnOnce(&V, V) -> anyhow::Result<Option<V>>,
        {
            match self.map.entry(key) {
                Entry::Occupied(mut o) => {
                    match combiner(o.get(), value).map_err(AggregationError::combiner)? {
                        Some(v) => {
                            o.insert(v);
                            Ok(Some(o.into_ref()))
                        }
                        None => {
                            o.remove();
                            Ok(None)
                        }
                    }
                }
                Entry::Vacant(slot) => Ok(Some(slot.insert(value))),
            }
        }

        pub fn compute_if_absent<F>(&self, key: K, factory: F) -> RefMut<'_, K, V>
        where
            F: FnOnce(&K) -> V,
        {
            match self.map.entry(key) {
                Entry::Occupied(o) => o.into_ref(),
                Entry::Vacant(slot) => {
                    let v = factory(slot.key());
                    slot.insert(v)
                }
            }
        }

        pub fn try_compute_if_absent<F>(
            &self,
            key: K,
            factory: F,
        ) -> Result<RefMut<'_, K, V>, AggregationError>
        where
            F: FnOnce(&K) -> anyhow::Result<V>,
        {
            match self.map.entry(key) {
                Entry::Occupied(o) => Ok(o.into_ref()),
                Entry::Vacant(slot) => {
                    let v = factory(slot.key()).map_err(AggregationError::factory)?;
                    Ok(slot.insert(v))
                }
            }
        }

        pub fn get(&self, key: &K) -> Option<V>
        where
            V: Clone,
        {
            self.map.get(key).map(|r| r.value().clone())
        }

        pub fn contains_key(&self, key: &K) -> bool {
            self.map.contains_key(key)
        }

        pub fn len(&self) -> usize {
            self.map.len()
        }

        pub fn is_empty(&self) -> bool {
            self.map.is_empty()
        }

        /// Copy the current contents out. Concurrent writers may or may not be
        /// reflected.
        pub fn snapshot(&self) -> HashMap<K, V>
        where
            K: Clone,
            V: Clone,
        {
            self.map
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect()
        }

        pub fn into_inner(self) -> DashMap<K, V> {
            self.map
        }
    }
}

//! Keyed containers shared by the grouping collectors and the map aggregator.
//!
//! - [`KeyedStore`] is the small surface both need from a map: presence check,
//!   lookup, insert-or-replace, removal, and lazy insertion returning a live
//!   reference to the stored value.
//! - [`MapKind`] picks which map a grouping builds ([`Hashed`] or [`Ordered`]),
//!   independent of the value type stored in it.

use std::collections::btree_map;
use std::collections::hash_map;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// A mutable keyed container where each key owns exactly one value.
pub trait KeyedStore<K, V> {
    fn contains_key(&self, key: &K) -> bool;

    fn get(&self, key: &K) -> Option<&V>;

    fn get_mut(&mut self, key: &K) -> Option<&mut V>;

    /// Insert or replace, returning the live stored value.
    fn put(&mut self, key: K, value: V) -> &mut V;

    fn remove(&mut self, key: &K) -> Option<V>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the value under `key`, inserting `f(&key)` first if absent.
    ///
    /// If `f` fails nothing is inserted.
    fn try_get_or_insert_with<E, F>(&mut self, key: K, f: F) -> Result<&mut V, E>
    where
        F: FnOnce(&K) -> Result<V, E>;

    fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V
    where
        F: FnOnce(&K) -> V,
    {
        match self.try_get_or_insert_with(key, |k| Ok::<V, std::convert::Infallible>(f(k))) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }
}

impl<K, V, S> KeyedStore<K, V> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        HashMap::get(self, key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        HashMap::get_mut(self, key)
    }

    fn put(&mut self, key: K, value: V) -> &mut V {
        match self.entry(key) {
            hash_map::Entry::Occupied(mut o) => {
                o.insert(value);
                o.into_mut()
            }
            hash_map::Entry::Vacant(v) => v.insert(value),
        }
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        HashMap::remove(self, key)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn try_get_or_insert_with<E, F>(&mut self, key: K, f: F) -> Result<&mut V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        match self.entry(key) {
            hash_map::Entry::Occupied(o) => Ok(o.into_mut()),
            hash_map::Entry::Vacant(v) => {
                let value = f(v.key())?;
                Ok(v.insert(value))
            }
        }
    }
}

impl<K, V> KeyedStore<K, V> for BTreeMap<K, V>
where
    K: Ord,
{
    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        BTreeMap::get_mut(self, key)
    }

    fn put(&mut self, key: K, value: V) -> &mut V {
        match self.entry(key) {
            btree_map::Entry::Occupied(mut o) => {
                o.insert(value);
                o.into_mut()
            }
            btree_map::Entry::Vacant(v) => v.insert(value),
        }
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        BTreeMap::remove(self, key)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn try_get_or_insert_with<E, F>(&mut self, key: K, f: F) -> Result<&mut V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        match self.entry(key) {
            btree_map::Entry::Occupied(o) => Ok(o.into_mut()),
            btree_map::Entry::Vacant(v) => {
                let value = f(v.key())?;
                Ok(v.insert(value))
            }
        }
    }
}

/// Selects the map type a grouping collector builds, for any value type.
pub trait MapKind<K>: Send + Sync + 'static {
    type Map<V>: KeyedStore<K, V> + IntoIterator<Item = (K, V)> + Default;
}

/// Group into a `HashMap` (iteration order unspecified).
#[derive(Clone, Copy, Debug, Default)]
pub struct Hashed;

/// Group into a `BTreeMap` (iteration in key order).
#[derive(Clone, Copy, Debug, Default)]
pub struct Ordered;

impl<K: Eq + Hash> MapKind<K> for Hashed {
    type Map<V> = HashMap<K, V>;
}

impl<K: Ord> MapKind<K> for Ordered {
    type Map<V> = BTreeMap<K, V>;
}

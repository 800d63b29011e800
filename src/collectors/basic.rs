//! Basic collectors: Count, Sum, Min, Max, ToVec, ToSet, Joining

use crate::collector::Collector;
use anyhow::Result;
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;
use std::mem::take;
use std::ops::Add;

/* ===================== Count ===================== */

/// Number of elements. Empty partitions contribute `0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<T> Collector<T> for Count {
    type Acc = u64;
    type Out = u64;

    fn create(&self) -> Result<u64> {
        Ok(0)
    }

    fn add_input(&self, acc: &mut u64, _v: T) -> Result<()> {
        *acc += 1;
        Ok(())
    }

    fn merge(&self, acc: &mut u64, other: u64) -> Result<()> {
        *acc += other;
        Ok(())
    }

    fn finish(&self, acc: u64) -> Result<u64> {
        Ok(acc)
    }
}

/* ===================== Sum<T> ===================== */

/// Sum of values.
///
/// Requires `T: Add<Output=T> + Default`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sum<T>(pub PhantomData<fn() -> T>);
impl<T> Sum<T> {
    /// Convenience constructor (same as `Default`).
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Collector<T> for Sum<T>
where
    T: Add<Output = T> + Default + Send,
{
    type Acc = T;
    type Out = T;

    fn create(&self) -> Result<T> {
        Ok(T::default())
    }

    fn add_input(&self, acc: &mut T, v: T) -> Result<()> {
        *acc = take(acc) + v;
        Ok(())
    }

    fn merge(&self, acc: &mut T, other: T) -> Result<()> {
        *acc = take(acc) + other;
        Ok(())
    }

    fn finish(&self, acc: T) -> Result<T> {
        Ok(acc)
    }
}

/* ===================== Min<T> / Max<T> ===================== */

/// Minimum value (`None` for an empty sequence). Ties keep the earlier element.
#[derive(Clone, Copy, Debug, Default)]
pub struct Min<T>(pub PhantomData<fn() -> T>);
impl<T> Min<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Collector<T> for Min<T>
where
    T: Ord + Send,
{
    type Acc = Option<T>;
    type Out = Option<T>;

    fn create(&self) -> Result<Option<T>> {
        Ok(None)
    }

    fn add_input(&self, acc: &mut Option<T>, v: T) -> Result<()> {
        match acc {
            Some(cur) => {
                if v < *cur {
                    *cur = v
                }
            }
            None => *acc = Some(v),
        }
        Ok(())
    }

    fn merge(&self, acc: &mut Option<T>, other: Option<T>) -> Result<()> {
        match other {
            Some(b) => self.add_input(acc, b),
            None => Ok(()),
        }
    }

    fn finish(&self, acc: Option<T>) -> Result<Option<T>> {
        Ok(acc)
    }
}

/// Maximum value (`None` for an empty sequence). Ties keep the earlier element.
#[derive(Clone, Copy, Debug, Default)]
pub struct Max<T>(pub PhantomData<fn() -> T>);
impl<T> Max<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Collector<T> for Max<T>
where
    T: Ord + Send,
{
    type Acc = Option<T>;
    type Out = Option<T>;

    fn create(&self) -> Result<Option<T>> {
        Ok(None)
    }

    fn add_input(&self, acc: &mut Option<T>, v: T) -> Result<()> {
        match acc {
            Some(cur) => {
                if v > *cur {
                    *cur = v
                }
            }
            None => *acc = Some(v),
        }
        Ok(())
    }

    fn merge(&self, acc: &mut Option<T>, other: Option<T>) -> Result<()> {
        match other {
            Some(b) => self.add_input(acc, b),
            None => Ok(()),
        }
    }

    fn finish(&self, acc: Option<T>) -> Result<Option<T>> {
        Ok(acc)
    }
}

/* ===================== ToVec<T> ===================== */

/// All elements in encounter order.
///
/// Partitions are contiguous and merged in index order, so parallel runs keep
/// the sequence order too.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToVec<T>(pub PhantomData<fn() -> T>);

pub fn to_vec<T>() -> ToVec<T> {
    ToVec(PhantomData)
}

impl<T: Send> Collector<T> for ToVec<T> {
    type Acc = Vec<T>;
    type Out = Vec<T>;

    fn create(&self) -> Result<Vec<T>> {
        Ok(Vec::new())
    }

    fn add_input(&self, acc: &mut Vec<T>, v: T) -> Result<()> {
        acc.push(v);
        Ok(())
    }

    fn merge(&self, acc: &mut Vec<T>, mut other: Vec<T>) -> Result<()> {
        acc.append(&mut other);
        Ok(())
    }

    fn finish(&self, acc: Vec<T>) -> Result<Vec<T>> {
        Ok(acc)
    }
}

/* ===================== ToSet<T> ===================== */

/// Distinct elements. Duplicates collapse by `Eq`; merge is set union.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToSet<T>(pub PhantomData<fn() -> T>);

pub fn to_set<T>() -> ToSet<T> {
    ToSet(PhantomData)
}

impl<T> Collector<T> for ToSet<T>
where
    T: Eq + Hash + Send,
{
    type Acc = HashSet<T>;
    type Out = HashSet<T>;

    fn create(&self) -> Result<HashSet<T>> {
        Ok(HashSet::new())
    }

    fn add_input(&self, acc: &mut HashSet<T>, v: T) -> Result<()> {
        acc.insert(v);
        Ok(())
    }

    fn merge(&self, acc: &mut HashSet<T>, other: HashSet<T>) -> Result<()> {
        if acc.is_empty() {
            *acc = other;
        } else {
            acc.extend(other);
        }
        Ok(())
    }

    fn finish(&self, acc: HashSet<T>) -> Result<HashSet<T>> {
        Ok(acc)
    }
}

/* ===================== Joining ===================== */

/// Concatenate string-like elements with a separator, prefix and suffix.
#[derive(Clone, Debug, Default)]
pub struct Joining {
    pub separator: String,
    pub prefix: String,
    pub suffix: String,
}

impl Joining {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_affixes(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }
}

impl<T: AsRef<str>> Collector<T> for Joining {
    // `None` until the first element, so separators only go between elements.
    type Acc = Option<String>;
    type Out = String;

    fn create(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn add_input(&self, acc: &mut Option<String>, v: T) -> Result<()> {
        match acc {
            Some(s) => {
                s.push_str(&self.separator);
                s.push_str(v.as_ref());
            }
            None => *acc = Some(v.as_ref().to_owned()),
        }
        Ok(())
    }

    fn merge(&self, acc: &mut Option<String>, other: Option<String>) -> Result<()> {
        match other {
            Some(b) => <Self as Collector<String>>::add_input(self, acc, b),
            None => Ok(()),
        }
    }

    fn finish(&self, acc: Option<String>) -> Result<String> {
        let body = acc.unwrap_or_default();
        Ok(format!("{}{body}{}", self.prefix, self.suffix))
    }
}

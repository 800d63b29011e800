//! Test helpers for collectors.
//!
//! - [`assert_collections_equal`]: exact, order-dependent comparison
//! - [`assert_collections_unordered_equal`]: same elements, any order
//! - [`assert_kv_collections_equal`]: key/value pairs compared after sorting by key
//! - [`assert_par_matches_seq`]: a collector gives the sequential result under
//!   every listed partition count
//!
//! ```
//! use ironcollect::*;
//! use ironcollect::testing::*;
//!
//! let counts = assert_par_matches_seq(0..1000u32, &grouping_by(|x: &u32| x % 7, Count), &[1, 2, 5, 64])?;
//! assert_kv_collections_equal(counts.into_iter().collect(), (0..7).map(|k| (k, if k < 6 { 143 } else { 142 })).collect());
//! # anyhow::Result::<()>::Ok(())
//! ```

use crate::collector::Collector;
use crate::runner::Runner;
use anyhow::Result;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Assert that two collections contain the same elements, ignoring order.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );

    let actual_set: HashSet<_> = actual.iter().collect();
    let expected_set: HashSet<_> = expected.iter().collect();
    if actual_set != expected_set {
        let missing: Vec<_> = expected_set.difference(&actual_set).collect();
        let extra: Vec<_> = actual_set.difference(&expected_set).collect();
        panic!("Collection content mismatch:\n  Missing elements: {missing:?}\n  Extra elements: {extra:?}");
    }
}

/// Assert that two collections of key/value pairs are equal after sorting by key.
///
/// Handy for hashed groupings, whose iteration order is unspecified.
///
/// # Panics
///
/// Panics if the collections differ after sorting.
pub fn assert_kv_collections_equal<K, V>(mut actual: Vec<(K, V)>, mut expected: Vec<(K, V)>)
where
    K: Debug + Ord,
    V: Debug + PartialEq,
{
    actual.sort_by(|a, b| a.0.cmp(&b.0));
    expected.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );

    for (i, ((ak, av), (ek, ev))) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            ak == ek && av == ev,
            "Collection mismatch at index {i} after sorting:\n  Expected: ({ek:?}, {ev:?})\n  Actual: ({ak:?}, {av:?})"
        );
    }
}

/// Collect `input` sequentially and then once per entry of `partitions`,
/// asserting every parallel result equals the sequential one. Returns the
/// sequential result.
///
/// # Errors
///
/// Returns the first collection failure.
///
/// # Panics
///
/// Panics if any parallel result differs from the sequential one.
pub fn assert_par_matches_seq<T, I, C>(input: I, coll: &C, partitions: &[usize]) -> Result<C::Out>
where
    I: IntoIterator<Item = T>,
    T: Clone + Send,
    C: Collector<T> + ?Sized,
    C::Out: Debug + PartialEq,
{
    let rows: Vec<T> = input.into_iter().collect();
    let expected = Runner::sequential().run(rows.clone(), coll)?;
    for &n in partitions {
        let actual = Runner::parallel(None, Some(n)).run(rows.clone(), coll)?;
        assert_eq!(
            actual, expected,
            "Parallel result with {n} partitions differs from the sequential one"
        );
    }
    Ok(expected)
}

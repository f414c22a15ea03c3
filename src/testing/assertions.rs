//! Assertions over canal output.

use crate::collection::Elem;
use crate::error::CanalError;
use crate::Canal;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two sequences are equal element by element.
///
/// # Panics
///
/// Panics with the first differing position when lengths or elements differ.
///
/// ```
/// use ironcanal::testing::assert_collections_equal;
///
/// assert_collections_equal(&[1, 2, 3], &[1, 2, 3]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    if let Some(i) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        panic!(
            "sequences differ at position {i}: expected {:?}, got {:?}\n  expected: {expected:?}\n  actual:   {actual:?}",
            expected[i], actual[i]
        );
    }
    assert_eq!(
        actual.len(),
        expected.len(),
        "sequence lengths differ\n  expected: {expected:?}\n  actual:   {actual:?}"
    );
}

/// Assert that two sequences hold the same elements with the same multiplicities, in any
/// order.
///
/// # Panics
///
/// Panics listing the elements whose counts differ.
///
/// ```
/// use ironcanal::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 2, 1], &[1, 1, 2, 3]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    let mut counts: HashMap<&T, i64> = HashMap::new();
    for a in actual {
        *counts.entry(a).or_default() += 1;
    }
    for e in expected {
        *counts.entry(e).or_default() -= 1;
    }
    let off: Vec<(&T, i64)> = counts.into_iter().filter(|(_, n)| *n != 0).collect();
    assert!(
        off.is_empty(),
        "multisets differ (positive = extra in actual, negative = missing): {off:?}\n  expected: {expected:?}\n  actual:   {actual:?}"
    );
}

/// Assert that two keyed sequences are equal once both are sorted by key (stable, so values
/// under the same key must match in order).
///
/// # Panics
///
/// Panics on the first differing pair after sorting.
pub fn assert_kv_collections_equal<K, V>(mut actual: Vec<(K, V)>, mut expected: Vec<(K, V)>)
where
    K: Debug + Ord,
    V: Debug + PartialEq,
{
    actual.sort_by(|a, b| a.0.cmp(&b.0));
    expected.sort_by(|a, b| a.0.cmp(&b.0));
    assert_collections_equal(&actual, &expected);
}

/// Assert that every element satisfies `predicate`.
///
/// # Panics
///
/// Panics naming the first element that does not.
pub fn assert_all<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    if let Some(i) = collection.iter().position(|t| !predicate(t)) {
        panic!(
            "element {i} ({:?}) does not satisfy the predicate\n  collection: {collection:?}",
            collection[i]
        );
    }
}

/// Assert that no element satisfies `predicate`.
///
/// # Panics
///
/// Panics naming the first element that does.
pub fn assert_none<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    if let Some(i) = collection.iter().position(predicate) {
        panic!(
            "element {i} ({:?}) unexpectedly satisfies the predicate\n  collection: {collection:?}",
            collection[i]
        );
    }
}

/// Collect `canal` and assert it yields exactly `expected`.
///
/// # Errors
///
/// Returns the traversal error if collecting fails.
///
/// # Panics
///
/// Panics when the output differs.
pub fn assert_canal_yields<T: Elem + Debug + PartialEq>(canal: &Canal<T>, expected: &[T]) -> Result<()> {
    let actual = canal.collect()?;
    assert_collections_equal(&actual, expected);
    Ok(())
}

/// Collect `canal` and return the engine error it failed with.
///
/// # Panics
///
/// Panics if the traversal succeeds or fails with something other than a [`CanalError`].
pub fn expect_canal_error<T: Elem + Debug>(canal: &Canal<T>) -> CanalError {
    match canal.collect() {
        Ok(v) => panic!("expected the traversal to fail, got {v:?}"),
        Err(e) => match e.downcast_ref::<CanalError>() {
            Some(err) => err.clone(),
            None => panic!("expected a CanalError, got: {e:#}"),
        },
    }
}

//! Assertion functions for checking load results.

use crate::frame::{DataType, Shard};
use crate::shards::Shards;

/// Assert that two loads have the same partitions with the same contents,
/// in the same order.
///
/// # Panics
///
/// Panics with the first differing partition if the loads differ.
pub fn assert_shards_equal(actual: &Shards, expected: &Shards) {
    assert_eq!(
        actual.num_partitions(),
        expected.num_partitions(),
        "Partition count mismatch:\n  Expected: {}\n  Actual: {}",
        expected.num_partitions(),
        actual.num_partitions()
    );
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Partition {i} differs:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Assert that `shard` has exactly `expected` as its column names, in order.
///
/// # Panics
///
/// Panics if the names differ.
pub fn assert_columns(shard: &Shard, expected: &[&str]) {
    let actual = shard.column_names();
    assert_eq!(
        actual, expected,
        "Column mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that `column` of `shard` has type `expected`.
///
/// # Panics
///
/// Panics if the column is missing or has another type.
pub fn assert_dtype(shard: &Shard, column: &str, expected: DataType) {
    let actual = shard
        .schema()
        .into_iter()
        .find(|(name, _)| *name == column)
        .map(|(_, dtype)| dtype);
    assert_eq!(
        actual,
        Some(expected),
        "Column '{column}' has dtype {actual:?}, expected {expected}"
    );
}

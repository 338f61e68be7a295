//! The handle returned by a successful load.

use crate::frame::Shard;

/// Ordered per-partition results of one load.
///
/// Partition `i` comes from the `i`-th part file in discovery order. The
/// contents are fixed at construction; [`collect`](Shards::collect) is a pure
/// read and never re-runs the load.
#[derive(Clone, Debug, PartialEq)]
pub struct Shards {
    parts: Vec<Shard>,
}

impl Shards {
    pub(crate) fn new(parts: Vec<Shard>) -> Self {
        Self { parts }
    }

    /// Materialized partitions, in discovery order.
    #[must_use]
    pub fn collect(&self) -> Vec<Shard> {
        self.parts.clone()
    }

    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    #[must_use]
    pub fn get(&self, partition: usize) -> Option<&Shard> {
        self.parts.get(partition)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shard> {
        self.parts.iter()
    }

    /// Total rows across partitions.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.parts.iter().map(Shard::num_rows).sum()
    }

    #[must_use]
    pub fn into_parts(self) -> Vec<Shard> {
        self.parts
    }
}

impl IntoIterator for Shards {
    type Item = Shard;
    type IntoIter = std::vec::IntoIter<Shard>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<'a> IntoIterator for &'a Shards {
    type Item = &'a Shard;
    type IntoIter = std::slice::Iter<'a, Shard>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

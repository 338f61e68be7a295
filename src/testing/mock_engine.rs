//! Engines that stand in for a cluster in tests.

use crate::io::path::PartFile;
use crate::runner::{ClusterEngine, Completed, ReadFn};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Runs every part on the calling thread and reports completions in
/// reverse submission order.
///
/// Also counts how many units of work it executed, so tests can check that
/// each partition ran exactly once.
#[derive(Debug, Default)]
pub struct ReverseOrderEngine {
    executed: AtomicUsize,
}

impl ReverseOrderEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Units of work executed so far.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }
}

impl ClusterEngine for ReverseOrderEngine {
    fn name(&self) -> &str {
        "reverse-order"
    }

    fn map_parts(&self, parts: &[PartFile], read: &ReadFn<'_>) -> Vec<Completed> {
        let mut done: Vec<Completed> = parts
            .iter()
            .map(|part| {
                self.executed.fetch_add(1, Ordering::SeqCst);
                Completed {
                    key: part.key,
                    outcome: read(part),
                }
            })
            .collect();
        done.reverse();
        done
    }
}

/// Loses the last result, to exercise the runner's completeness check.
#[derive(Debug, Default)]
pub struct LossyEngine;

impl ClusterEngine for LossyEngine {
    fn name(&self) -> &str {
        "lossy"
    }

    fn map_parts(&self, parts: &[PartFile], read: &ReadFn<'_>) -> Vec<Completed> {
        let mut done: Vec<Completed> = parts
            .iter()
            .map(|part| Completed {
                key: part.key,
                outcome: read(part),
            })
            .collect();
        done.pop();
        done
    }
}

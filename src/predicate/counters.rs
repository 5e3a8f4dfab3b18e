//! Shared profiling counters fed by predicate bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only counter shared between a predicate and the profiling
/// registry. Increments use relaxed ordering: readers only need eventual
/// totals, never ordering against other memory.
#[derive(Debug, Default)]
pub struct ProfileCounter(AtomicU64);

impl ProfileCounter {
    /// Creates a zeroed counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the counter.
    pub fn add(&self, delta: u64) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }

    /// Returns the current total.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

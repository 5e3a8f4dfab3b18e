//! Periodic selectivity sampling for runtime-filter predicates.
//!
//! A predicate that passes almost every row is not worth evaluating. The
//! sampler watches cumulative filtered/input totals inside a fixed window and
//! caches an `always_true` verdict for the remainder of the window; the next
//! window starts from a clean slate. All fields are interior-mutable `Cell`s:
//! the owning pipeline lane is the single writer, and the state is
//! deliberately not `Sync`.

use std::cell::Cell;

/// Configuration for the selectivity sampler.
#[derive(Clone, Copy, Debug)]
pub struct SamplerConfig {
    /// Number of evaluations between judgment resets.
    pub sampling_frequency: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sampling_frequency: 64,
        }
    }
}

/// Single-writer sampler state attached to every predicate instance.
#[derive(Debug)]
pub(crate) struct SelectivityState {
    config: SamplerConfig,
    judge_counter: Cell<u32>,
    judge_input_rows: Cell<u64>,
    judge_filter_rows: Cell<u64>,
    always_true: Cell<bool>,
}

impl SelectivityState {
    pub(crate) fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            judge_counter: Cell::new(config.sampling_frequency),
            judge_input_rows: Cell::new(0),
            judge_filter_rows: Cell::new(0),
            always_true: Cell::new(false),
        }
    }

    /// Only valid from the owning thread.
    pub(crate) fn always_true(&self) -> bool {
        self.always_true.get()
    }

    /// Restarts a sampling window. Counters and the cached verdict are
    /// cleared together, never independently.
    pub(crate) fn reset(&self) {
        self.judge_counter.set(self.config.sampling_frequency);
        self.judge_input_rows.set(0);
        self.judge_filter_rows.set(0);
        self.always_true.set(false);
    }

    /// Feeds one evaluation's totals into the current window.
    ///
    /// Returns true when this call transitioned the state to `always_true`.
    pub(crate) fn observe(&self, filter_rows: u64, input_rows: u64, ignore_threshold: f64) -> bool {
        let counter = self.judge_counter.get();
        if counter == 0 {
            self.reset();
        } else {
            self.judge_counter.set(counter - 1);
        }

        if self.always_true.get() {
            return false;
        }
        self.judge_filter_rows
            .set(self.judge_filter_rows.get() + filter_rows);
        self.judge_input_rows
            .set(self.judge_input_rows.get() + input_rows);
        if judge_selectivity(
            ignore_threshold,
            self.judge_filter_rows.get(),
            self.judge_input_rows.get(),
        ) {
            self.always_true.set(true);
            return true;
        }
        false
    }
}

/// The verdict rule: the cumulative filtered ratio is negligible when it is
/// strictly below the threshold. A threshold of zero therefore never judges
/// a predicate always-true.
fn judge_selectivity(ignore_threshold: f64, filter_rows: u64, input_rows: u64) -> bool {
    input_rows > 0 && (filter_rows as f64) / (input_rows as f64) < ignore_threshold
}

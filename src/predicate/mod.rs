//! Polymorphic column predicate contract and shared orchestration.
//!
//! Every concrete variant implements [`ColumnPredicate`]; the trait's
//! provided methods supply the orchestration that is common to all of them:
//! the always-true short circuit, selectivity sampling for runtime filters,
//! and filter bookkeeping. Variants only bring their comparison kernels and
//! the index/statistics strategies they actually support.
//!
//! A predicate instance is owned by one execution pipeline lane. The sampler
//! state mutates through `Cell`s without synchronization, so concurrent
//! evaluation of the same instance is not supported; independent instances
//! share nothing but the atomic profiling counters.

pub mod bitmap;
pub mod bloom;
pub mod comparison;
pub mod in_list;
pub mod kind;
pub mod null;
pub mod text;

mod counters;
mod sampler;

use std::sync::Arc;

use arrow::{array::Array, datatypes::DataType};
use roaring::RoaringBitmap;

pub use self::{counters::ProfileCounter, kind::PredicateKind, sampler::SamplerConfig};
use self::sampler::SelectivityState;
use crate::{
    error::PredicateError,
    index::{BitmapIndexIterator, BloomFilter, TextIndexIterator},
    logging::sift_log,
    scalar::ScalarValueRef,
};

/// Shared per-predicate state: identity, negation, runtime-filter wiring,
/// sampler state and the profiling counter pair.
#[derive(Debug)]
pub struct PredicateBase {
    column_id: u32,
    opposite: bool,
    runtime_filter_id: i32,
    selectivity: SelectivityState,
    input_rows_counter: Arc<ProfileCounter>,
    filtered_rows_counter: Arc<ProfileCounter>,
}

impl PredicateBase {
    /// Creates base state for a predicate authored directly from a query
    /// condition (runtime-filter id `-1`).
    #[must_use]
    pub fn new(column_id: u32, opposite: bool) -> Self {
        Self::with_sampler_config(column_id, opposite, SamplerConfig::default())
    }

    /// Creates base state with an explicit sampler configuration.
    #[must_use]
    pub fn with_sampler_config(column_id: u32, opposite: bool, config: SamplerConfig) -> Self {
        Self {
            column_id,
            opposite,
            runtime_filter_id: -1,
            selectivity: SelectivityState::new(config),
            input_rows_counter: Arc::new(ProfileCounter::new()),
            filtered_rows_counter: Arc::new(ProfileCounter::new()),
        }
    }

    /// Target column ordinal within the row schema.
    #[must_use]
    pub fn column_id(&self) -> u32 {
        self.column_id
    }

    /// True when the condition's result is logically inverted.
    #[must_use]
    pub fn opposite(&self) -> bool {
        self.opposite
    }

    /// Runtime-filter id, `-1` for authored predicates.
    #[must_use]
    pub fn runtime_filter_id(&self) -> i32 {
        self.runtime_filter_id
    }

    /// One-time wiring of the profiling counter pair during pipeline setup.
    pub fn attach_profile_counters(
        &mut self,
        filter_id: i32,
        input_rows: Arc<ProfileCounter>,
        filtered_rows: Arc<ProfileCounter>,
    ) {
        self.runtime_filter_id = filter_id;
        self.input_rows_counter = input_rows;
        self.filtered_rows_counter = filtered_rows;
    }

    fn update_filter_info(&self, filter_rows: u64, input_rows: u64) {
        self.input_rows_counter.add(input_rows);
        self.filtered_rows_counter.add(filter_rows);
    }

    fn selectivity(&self) -> &SelectivityState {
        &self.selectivity
    }
}

/// Contract implemented by every concrete predicate variant.
pub trait ColumnPredicate {
    /// Kind tag of this predicate.
    fn kind(&self) -> PredicateKind;

    /// Shared base state.
    fn base(&self) -> &PredicateBase;

    /// Mutable access to the shared base state.
    fn base_mut(&mut self) -> &mut PredicateBase;

    /// Declares the physical input types and nullability combinations this
    /// predicate can evaluate without undefined behavior.
    fn can_do_apply_safely(&self, input_type: &DataType, is_null: bool) -> bool;

    /// Comparison kernel: compacts surviving indices of `sel[..size]` to the
    /// front and returns the new count. Callers go through [`evaluate`]
    /// (`ColumnPredicate::evaluate`), which adds the shared orchestration.
    fn evaluate_inner(&self, column: &dyn Array, sel: &mut [u16], size: u16) -> u16;

    /// Evaluates the condition against a bitmap index, producing the
    /// matching row-id set.
    fn evaluate_bitmap_index(
        &self,
        iterator: &mut dyn BitmapIndexIterator,
        num_rows: u32,
    ) -> Result<RoaringBitmap, PredicateError>;

    /// Variant-specific part of [`debug_string`](ColumnPredicate::debug_string).
    fn debug_inner(&self) -> String;

    /// Short-circuit evaluation entry point.
    ///
    /// Returns `size` untouched while the sampler holds an always-true
    /// verdict; otherwise runs the kernel, feeds the sampler when the
    /// predicate is ignorable, and updates the filter counters.
    fn evaluate(&self, column: &dyn Array, sel: &mut [u16], size: u16) -> u16 {
        let base = self.base();
        if base.selectivity().always_true() {
            return size;
        }
        let new_size = self.evaluate_inner(column, sel, size);
        let filtered = u64::from(size - new_size);
        if self.can_ignore() {
            let transitioned =
                base.selectivity()
                    .observe(filtered, u64::from(size), self.ignore_threshold());
            if transitioned {
                sift_log!(
                    log::Level::Debug,
                    "predicate_always_true",
                    "{}",
                    self.debug_string()
                );
            }
        }
        base.update_filter_info(filtered, u64::from(size));
        new_size
    }

    /// Vectorized evaluation: one flag per row, no compaction.
    ///
    /// Only variants used on the lazy-materialization path implement this;
    /// invoking the default is a wiring error.
    fn evaluate_vec(&self, _column: &dyn Array, _size: u16, _flags: &mut [bool]) {
        panic!("evaluate_vec is not implemented for {} predicate", self.kind());
    }

    /// Vectorized evaluation ANDed into an existing flag array.
    ///
    /// Same contract as [`evaluate_vec`](ColumnPredicate::evaluate_vec).
    fn evaluate_and_vec(&self, _column: &dyn Array, _size: u16, _flags: &mut [bool]) {
        panic!(
            "evaluate_and_vec is not implemented for {} predicate",
            self.kind()
        );
    }

    /// Composes this predicate's per-row result into `flags` via logical AND.
    fn evaluate_and(&self, _column: &dyn Array, _sel: &[u16], _size: u16, _flags: &mut [bool]) {}

    /// Composes this predicate's per-row result into `flags` via logical OR.
    fn evaluate_or(&self, _column: &dyn Array, _sel: &[u16], _size: u16, _flags: &mut [bool]) {}

    /// True when zone-map statistics can answer anything for this kind.
    fn support_zone_map(&self) -> bool {
        true
    }

    /// Statistics evaluation: true means the page must be scanned, false
    /// means the (min, max) pair rules every row out.
    fn evaluate_zone_map(&self, _min: ScalarValueRef<'_>, _max: ScalarValueRef<'_>) -> bool {
        true
    }

    /// True when the statistics prove every row in the page satisfies the
    /// condition. Only meaningful for pages without nulls.
    fn zone_map_always_true(&self, _min: ScalarValueRef<'_>, _max: ScalarValueRef<'_>) -> bool {
        false
    }

    /// True when the statistics prove every row in the page satisfies a
    /// delete condition carried by this predicate.
    fn evaluate_del(&self, _min: ScalarValueRef<'_>, _max: ScalarValueRef<'_>) -> bool {
        false
    }

    /// Bloom-filter evaluation: false only when the filter proves no row
    /// can match.
    fn evaluate_bloom(&self, _filter: &dyn BloomFilter) -> bool {
        true
    }

    /// Dictionary word-list evaluation: false only when the dictionary
    /// proves no row can match.
    fn evaluate_dict(&self, _words: &[&str]) -> bool {
        true
    }

    /// True when this predicate's probe values can be checked against a
    /// bloom filter.
    fn can_do_bloom_filter(&self) -> bool {
        false
    }

    /// Full-text index evaluation. Unsupported by most kinds; the typed
    /// failure tells callers to fall back to column-level evaluation.
    fn evaluate_text_index(
        &self,
        _iterator: &mut dyn TextIndexIterator,
        _num_rows: u32,
    ) -> Result<RoaringBitmap, PredicateError> {
        Err(PredicateError::not_supported(
            self.kind(),
            "text index evaluation",
        ))
    }

    /// Filtered-ratio threshold below which the sampler may judge this
    /// predicate always-true. Zero disables the judgment.
    fn ignore_threshold(&self) -> f64 {
        0.0
    }

    /// True when evaluation may be skipped once proven unselective. Only
    /// predicates carrying a runtime-filter id qualify.
    fn can_ignore(&self) -> bool {
        self.base().runtime_filter_id() != -1
    }

    /// Whether this predicate was created by a runtime filter.
    fn is_runtime_filter(&self) -> bool {
        self.can_ignore()
    }

    /// Target column ordinal.
    fn column_id(&self) -> u32 {
        self.base().column_id()
    }

    /// True when the condition's result is logically inverted.
    fn opposite(&self) -> bool {
        self.base().opposite()
    }

    /// Runtime-filter id, `-1` for authored predicates.
    fn runtime_filter_id(&self) -> i32 {
        self.base().runtime_filter_id()
    }

    /// One-time wiring of the profiling counter pair during pipeline setup.
    fn attach_profile_counters(
        &mut self,
        filter_id: i32,
        input_rows: Arc<ProfileCounter>,
        filtered_rows: Arc<ProfileCounter>,
    ) {
        self.base_mut()
            .attach_profile_counters(filter_id, input_rows, filtered_rows);
    }

    /// Stable diagnostic rendering. Never affects control flow.
    fn debug_string(&self) -> String {
        let base = self.base();
        format!(
            "{}, column_id={}, opposite={}, can_ignore={}, runtime_filter_id={}",
            self.debug_inner(),
            base.column_id(),
            base.opposite(),
            self.can_ignore(),
            base.runtime_filter_id()
        )
    }
}

/// Compacts `sel[..size]` through `keep`, writing survivors to the front.
///
/// The selection vector is dense (implicit identity) exactly when the column
/// length equals `size`; otherwise the explicit sparse indices are used. Each
/// call site instantiates this with a monomorphized `keep` closure, so the
/// null-aware and null-free kernels stay separate loops with no per-row
/// branching on nullability.
pub(crate) fn compact_selection<F>(column_len: usize, sel: &mut [u16], size: u16, keep: F) -> u16
where
    F: Fn(u16) -> bool,
{
    let mut new_size: u16 = 0;
    if column_len == usize::from(size) {
        for i in 0..size {
            if keep(i) {
                sel[usize::from(new_size)] = i;
                new_size += 1;
            }
        }
    } else {
        for i in 0..size {
            let idx = sel[usize::from(i)];
            if keep(idx) {
                sel[usize::from(new_size)] = idx;
                new_size += 1;
            }
        }
    }
    new_size
}

/// Complements a matched row-id set within `0..num_rows`, excluding nulls.
pub(crate) fn complement_rows(
    matched: RoaringBitmap,
    num_rows: u32,
    nulls: Option<&RoaringBitmap>,
) -> RoaringBitmap {
    let mut out = RoaringBitmap::new();
    out.insert_range(0..num_rows);
    out -= &matched;
    if let Some(nulls) = nulls {
        out -= nulls;
    }
    out
}

/// Reads the index's null bitmap, when it tracks one.
pub(crate) fn read_null_bitmap(
    iterator: &mut dyn BitmapIndexIterator,
) -> Result<Option<RoaringBitmap>, PredicateError> {
    if !iterator.has_null_bitmap() {
        return Ok(None);
    }
    let mut nulls = RoaringBitmap::new();
    iterator.null_bitmap(&mut nulls)?;
    Ok(Some(nulls))
}

//! Binary comparison predicates over primitive columns.

use std::{cmp::Ordering, fmt, mem::discriminant};

use arrow::{
    array::{Array, AsArray},
    datatypes::{ArrowPrimitiveType, DataType},
};
use roaring::RoaringBitmap;

use super::{
    compact_selection, complement_rows, read_null_bitmap, ColumnPredicate, PredicateBase,
    PredicateKind,
};
use crate::{
    error::PredicateError,
    index::{BitmapIndexIterator, BloomFilter},
    scalar::{NativeValue, ScalarValue, ScalarValueRef},
};

/// Comparison operator of a binary predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equals (`=`).
    Equal,
    /// Not equals (`!=`).
    NotEqual,
    /// Less than (`<`).
    LessThan,
    /// Less than or equal to (`<=`).
    LessThanOrEqual,
    /// Greater than (`>`).
    GreaterThan,
    /// Greater than or equal to (`>=`).
    GreaterThanOrEqual,
}

impl ComparisonOp {
    /// Returns a textual representation of the operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterThanOrEqual => ">=",
        }
    }

    /// Returns the logical negation of this operator.
    #[must_use]
    pub fn negated(self) -> Self {
        match self {
            ComparisonOp::Equal => ComparisonOp::NotEqual,
            ComparisonOp::NotEqual => ComparisonOp::Equal,
            ComparisonOp::LessThan => ComparisonOp::GreaterThanOrEqual,
            ComparisonOp::LessThanOrEqual => ComparisonOp::GreaterThan,
            ComparisonOp::GreaterThan => ComparisonOp::LessThanOrEqual,
            ComparisonOp::GreaterThanOrEqual => ComparisonOp::LessThan,
        }
    }

    /// Returns the operator with its operands swapped, for rewrites that
    /// normalize the column onto the left-hand side.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            ComparisonOp::Equal => ComparisonOp::Equal,
            ComparisonOp::NotEqual => ComparisonOp::NotEqual,
            ComparisonOp::LessThan => ComparisonOp::GreaterThan,
            ComparisonOp::LessThanOrEqual => ComparisonOp::GreaterThanOrEqual,
            ComparisonOp::GreaterThan => ComparisonOp::LessThan,
            ComparisonOp::GreaterThanOrEqual => ComparisonOp::LessThanOrEqual,
        }
    }

    /// Evaluates the operator against a comparison ordering.
    #[must_use]
    pub fn test_ordering(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Equal => ordering == Ordering::Equal,
            ComparisonOp::NotEqual => ordering != Ordering::Equal,
            ComparisonOp::LessThan => ordering == Ordering::Less,
            ComparisonOp::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOp::GreaterThan => ordering == Ordering::Greater,
            ComparisonOp::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }

    /// Maps the operator onto the predicate taxonomy.
    #[must_use]
    pub fn predicate_kind(self) -> PredicateKind {
        match self {
            ComparisonOp::Equal => PredicateKind::Eq,
            ComparisonOp::NotEqual => PredicateKind::Ne,
            ComparisonOp::LessThan => PredicateKind::Lt,
            ComparisonOp::LessThanOrEqual => PredicateKind::Le,
            ComparisonOp::GreaterThan => PredicateKind::Gt,
            ComparisonOp::GreaterThanOrEqual => PredicateKind::Ge,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison predicate over a primitive column.
#[derive(Debug)]
pub struct ComparisonPredicate<T: ArrowPrimitiveType> {
    base: PredicateBase,
    op: ComparisonOp,
    value: T::Native,
    stat_value: ScalarValue,
    ignore_threshold: f64,
}

impl<T> ComparisonPredicate<T>
where
    T: ArrowPrimitiveType,
    T::Native: NativeValue,
{
    /// Creates a comparison predicate on `column_id`.
    #[must_use]
    pub fn new(column_id: u32, op: ComparisonOp, value: T::Native, opposite: bool) -> Self {
        Self {
            base: PredicateBase::new(column_id, opposite),
            op,
            value,
            stat_value: value.to_scalar(),
            ignore_threshold: 0.0,
        }
    }

    /// Overrides the statistics-path comparison value.
    ///
    /// Temporal columns decode their zone-map bounds into calendar values
    /// while the kernel compares raw natives; this keeps both paths usable.
    #[must_use]
    pub fn with_stat_value(mut self, stat_value: ScalarValue) -> Self {
        self.stat_value = stat_value;
        self
    }

    /// Overrides the sampler's ignore threshold for this instance.
    #[must_use]
    pub fn with_ignore_threshold(mut self, threshold: f64) -> Self {
        self.ignore_threshold = threshold;
        self
    }

    fn matches(&self, candidate: T::Native) -> bool {
        match candidate.partial_cmp(&self.value) {
            Some(ordering) => self.op.test_ordering(ordering),
            None => false,
        }
    }

    fn compose_flags<F>(&self, column: &dyn Array, sel: &[u16], size: u16, mut combine: F)
    where
        F: FnMut(usize, bool),
    {
        let array = column.as_primitive::<T>();
        let values = array.values();
        let opposite = self.base.opposite();
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => {
                for i in 0..usize::from(size) {
                    let idx = usize::from(sel[i]);
                    combine(i, opposite ^ (nulls.is_valid(idx) && self.matches(values[idx])));
                }
            }
            None => {
                for i in 0..usize::from(size) {
                    let idx = usize::from(sel[i]);
                    combine(i, opposite ^ self.matches(values[idx]));
                }
            }
        }
    }

    /// Bounds comparison against the probe; `None` when the families differ.
    fn zone_map_orderings(
        &self,
        min: ScalarValueRef<'_>,
        max: ScalarValueRef<'_>,
    ) -> Option<(Ordering, Ordering)> {
        let probe = self.stat_value.as_ref();
        Some((min.compare(probe)?, max.compare(probe)?))
    }
}

/// True when page bounds ordered (`lo`, `hi`) against the probe may contain
/// a row satisfying the plain (non-inverted) operator.
fn op_overlaps_page(op: ComparisonOp, lo: Ordering, hi: Ordering) -> bool {
    match op {
        ComparisonOp::Equal => lo != Ordering::Greater && hi != Ordering::Less,
        ComparisonOp::NotEqual => !(lo == Ordering::Equal && hi == Ordering::Equal),
        ComparisonOp::LessThan => lo == Ordering::Less,
        ComparisonOp::LessThanOrEqual => lo != Ordering::Greater,
        ComparisonOp::GreaterThan => hi == Ordering::Greater,
        ComparisonOp::GreaterThanOrEqual => hi != Ordering::Less,
    }
}

/// True when page bounds prove every row satisfies the plain operator.
fn op_covers_page(op: ComparisonOp, lo: Ordering, hi: Ordering) -> bool {
    match op {
        ComparisonOp::Equal => lo == Ordering::Equal && hi == Ordering::Equal,
        ComparisonOp::NotEqual => hi == Ordering::Less || lo == Ordering::Greater,
        ComparisonOp::LessThan => hi == Ordering::Less,
        ComparisonOp::LessThanOrEqual => hi != Ordering::Greater,
        ComparisonOp::GreaterThan => lo == Ordering::Greater,
        ComparisonOp::GreaterThanOrEqual => lo != Ordering::Less,
    }
}

impl<T> ColumnPredicate for ComparisonPredicate<T>
where
    T: ArrowPrimitiveType,
    T::Native: NativeValue,
{
    fn kind(&self) -> PredicateKind {
        self.op.predicate_kind()
    }

    fn base(&self) -> &PredicateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PredicateBase {
        &mut self.base
    }

    fn can_do_apply_safely(&self, input_type: &DataType, _is_null: bool) -> bool {
        // Physical representation match; both nullabilities have kernels.
        discriminant(input_type) == discriminant(&T::DATA_TYPE)
    }

    fn evaluate_inner(&self, column: &dyn Array, sel: &mut [u16], size: u16) -> u16 {
        let array = column.as_primitive::<T>();
        let values = array.values();
        let opposite = self.base.opposite();
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => compact_selection(array.len(), sel, size, |idx| {
                let idx = usize::from(idx);
                opposite ^ (nulls.is_valid(idx) && self.matches(values[idx]))
            }),
            None => compact_selection(array.len(), sel, size, |idx| {
                opposite ^ self.matches(values[usize::from(idx)])
            }),
        }
    }

    fn evaluate_vec(&self, column: &dyn Array, size: u16, flags: &mut [bool]) {
        let array = column.as_primitive::<T>();
        let values = array.values();
        let opposite = self.base.opposite();
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => {
                for i in 0..usize::from(size) {
                    flags[i] = opposite ^ (nulls.is_valid(i) && self.matches(values[i]));
                }
            }
            None => {
                for i in 0..usize::from(size) {
                    flags[i] = opposite ^ self.matches(values[i]);
                }
            }
        }
    }

    fn evaluate_and_vec(&self, column: &dyn Array, size: u16, flags: &mut [bool]) {
        let array = column.as_primitive::<T>();
        let values = array.values();
        let opposite = self.base.opposite();
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => {
                for i in 0..usize::from(size) {
                    flags[i] &= opposite ^ (nulls.is_valid(i) && self.matches(values[i]));
                }
            }
            None => {
                for i in 0..usize::from(size) {
                    flags[i] &= opposite ^ self.matches(values[i]);
                }
            }
        }
    }

    fn evaluate_and(&self, column: &dyn Array, sel: &[u16], size: u16, flags: &mut [bool]) {
        self.compose_flags(column, sel, size, |i, matched| flags[i] &= matched);
    }

    fn evaluate_or(&self, column: &dyn Array, sel: &[u16], size: u16, flags: &mut [bool]) {
        self.compose_flags(column, sel, size, |i, matched| flags[i] |= matched);
    }

    fn evaluate_zone_map(&self, min: ScalarValueRef<'_>, max: ScalarValueRef<'_>) -> bool {
        let Some((lo, hi)) = self.zone_map_orderings(min, max) else {
            return true;
        };
        // Inversion swaps the two verdicts: the inverted condition keeps no
        // row exactly when the plain condition provably keeps every row.
        if self.base.opposite() {
            !op_covers_page(self.op, lo, hi)
        } else {
            op_overlaps_page(self.op, lo, hi)
        }
    }

    fn zone_map_always_true(&self, min: ScalarValueRef<'_>, max: ScalarValueRef<'_>) -> bool {
        let Some((lo, hi)) = self.zone_map_orderings(min, max) else {
            return false;
        };
        if self.base.opposite() {
            !op_overlaps_page(self.op, lo, hi)
        } else {
            op_covers_page(self.op, lo, hi)
        }
    }

    fn evaluate_del(&self, min: ScalarValueRef<'_>, max: ScalarValueRef<'_>) -> bool {
        // Delete conditions are authored non-inverted; the whole page is
        // deleted exactly when every row satisfies the condition.
        self.zone_map_always_true(min, max)
    }

    fn evaluate_bloom(&self, filter: &dyn BloomFilter) -> bool {
        if self.can_do_bloom_filter() {
            filter.maybe_contains(self.stat_value.as_ref())
        } else {
            true
        }
    }

    fn can_do_bloom_filter(&self) -> bool {
        // An inverted equality matches everything the filter rules out.
        self.op == ComparisonOp::Equal && !self.base.opposite()
    }

    fn evaluate_bitmap_index(
        &self,
        iterator: &mut dyn BitmapIndexIterator,
        num_rows: u32,
    ) -> Result<RoaringBitmap, PredicateError> {
        let dictionary_len = iterator.dictionary_len();
        let seek = iterator.seek(self.stat_value.as_ref())?;
        let exact = u32::from(seek.exact);
        // NotEqual collects the equal rows and complements them below.
        let (ordinals, negate) = match self.op {
            ComparisonOp::Equal | ComparisonOp::NotEqual => (
                seek.ordinal..seek.ordinal + exact,
                self.op == ComparisonOp::NotEqual,
            ),
            ComparisonOp::LessThan => (0..seek.ordinal, false),
            ComparisonOp::LessThanOrEqual => (0..seek.ordinal + exact, false),
            ComparisonOp::GreaterThan => (seek.ordinal + exact..dictionary_len, false),
            ComparisonOp::GreaterThanOrEqual => (seek.ordinal..dictionary_len, false),
        };
        let mut matched = RoaringBitmap::new();
        if !ordinals.is_empty() {
            iterator.union_bitmaps(ordinals, &mut matched)?;
        }
        if negate ^ self.base.opposite() {
            let nulls = read_null_bitmap(iterator)?;
            matched = complement_rows(matched, num_rows, nulls.as_ref());
        }
        Ok(matched)
    }

    fn ignore_threshold(&self) -> f64 {
        self.ignore_threshold
    }

    fn debug_inner(&self) -> String {
        format!("cmp({} {:?})", self.op, self.stat_value)
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::Int64Array;
    use arrow::datatypes::Int64Type;

    use super::*;
    use crate::test_util::MemoryBitmapIndex;

    fn predicate(op: ComparisonOp, value: i64, opposite: bool) -> ComparisonPredicate<Int64Type> {
        ComparisonPredicate::new(0, op, value, opposite)
    }

    #[test]
    fn equality_keeps_matching_rows() {
        let column = Int64Array::from(vec![3, 5, 5, 7]);
        let pred = predicate(ComparisonOp::Equal, 5, false);
        let mut sel = [0u16; 4];
        let survivors = pred.evaluate(&column, &mut sel, 4);
        assert_eq!(&sel[..usize::from(survivors)], &[1, 2]);
    }

    #[test]
    fn opposite_inverts_survivors() {
        let column = Int64Array::from(vec![3, 5, 5, 7]);
        let pred = predicate(ComparisonOp::Equal, 5, true);
        let mut sel = [0u16; 4];
        let survivors = pred.evaluate(&column, &mut sel, 4);
        assert_eq!(&sel[..usize::from(survivors)], &[0, 3]);
    }

    #[test]
    fn null_rows_never_match() {
        let column = Int64Array::from(vec![Some(5), None, Some(5), Some(2)]);
        let pred = predicate(ComparisonOp::Equal, 5, false);
        let mut sel = [0u16; 4];
        let survivors = pred.evaluate(&column, &mut sel, 4);
        assert_eq!(&sel[..usize::from(survivors)], &[0, 2]);
    }

    #[test]
    fn sparse_selection_is_a_subsequence() {
        let column = Int64Array::from(vec![5, 5, 5, 5, 1]);
        let pred = predicate(ComparisonOp::Equal, 5, false);
        let mut sel = [1u16, 3, 4];
        let survivors = pred.evaluate(&column, &mut sel, 3);
        assert_eq!(&sel[..usize::from(survivors)], &[1, 3]);
    }

    #[test]
    fn dense_and_sparse_paths_agree() {
        let values: Vec<i64> = (0..256).map(|_| fastrand::i64(0..10)).collect();
        let column = Int64Array::from(values.clone());
        let pred = predicate(ComparisonOp::GreaterThan, 4, false);

        let mut dense_sel = [0u16; 256];
        let dense_size = pred.evaluate(&column, &mut dense_sel, 256);

        // Same prefix with an extra trailing row, so the same explicit
        // identity vector takes the sparse path.
        let mut longer = values;
        longer.push(0);
        let longer_column = Int64Array::from(longer);
        let mut sparse_sel: Vec<u16> = (0..256u16).collect();
        let sparse_size = pred.evaluate(&longer_column, &mut sparse_sel, 256);

        assert_eq!(dense_size, sparse_size);
        assert_eq!(
            &dense_sel[..usize::from(dense_size)],
            &sparse_sel[..usize::from(sparse_size)]
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let column = Int64Array::from(vec![1, 6, 2, 9, 8]);
        let pred = predicate(ComparisonOp::GreaterThanOrEqual, 6, false);
        let mut sel = [0u16; 5];
        let first = pred.evaluate(&column, &mut sel, 5);
        let second = pred.evaluate(&column, &mut sel, first);
        assert_eq!(first, second);
        assert_eq!(&sel[..usize::from(second)], &[1, 3, 4]);
    }

    #[test]
    fn zone_map_rules_out_disjoint_ranges() {
        // Page range [25, 30] cannot contain a row <= 20.
        let upper = predicate(ComparisonOp::LessThanOrEqual, 20, false);
        let min = ScalarValue::Int64(25);
        let max = ScalarValue::Int64(30);
        assert!(!upper.evaluate_zone_map(min.as_ref(), max.as_ref()));

        // The lower half of the same range condition must still scan.
        let lower = predicate(ComparisonOp::GreaterThanOrEqual, 10, false);
        assert!(lower.evaluate_zone_map(min.as_ref(), max.as_ref()));
    }

    #[test]
    fn zone_map_mismatched_family_is_conservative() {
        let pred = predicate(ComparisonOp::Equal, 5, false);
        let min = ScalarValue::Utf8("a".into());
        let max = ScalarValue::Utf8("z".into());
        assert!(pred.evaluate_zone_map(min.as_ref(), max.as_ref()));
        assert!(!pred.zone_map_always_true(min.as_ref(), max.as_ref()));
    }

    #[test]
    fn opposite_swaps_zone_map_verdicts() {
        // Inverted Eq(5) keeps every row of a page ranging [25, 30]; the
        // statistics path must agree with the kernel instead of pruning it.
        let column = Int64Array::from(vec![25, 27, 30]);
        let pred = predicate(ComparisonOp::Equal, 5, true);
        let mut sel = [0u16; 3];
        assert_eq!(pred.evaluate(&column, &mut sel, 3), 3);

        let min = ScalarValue::Int64(25);
        let max = ScalarValue::Int64(30);
        assert!(pred.evaluate_zone_map(min.as_ref(), max.as_ref()));
        assert!(pred.zone_map_always_true(min.as_ref(), max.as_ref()));

        // A page pinned to the probe value is fully eliminated instead.
        let probe = ScalarValue::Int64(5);
        assert!(!pred.evaluate_zone_map(probe.as_ref(), probe.as_ref()));
        assert!(!pred.zone_map_always_true(probe.as_ref(), probe.as_ref()));
    }

    #[test]
    fn opposite_equality_skips_the_bloom_path() {
        use crate::test_util::SetBloomFilter;

        // The filter lacks 5, yet inverted Eq(5) matches everything else.
        let filter = SetBloomFilter::of(&[ScalarValue::Int64(9)]);
        let pred = predicate(ComparisonOp::Equal, 5, true);
        assert!(!pred.can_do_bloom_filter());
        assert!(pred.evaluate_bloom(&filter));

        let plain = predicate(ComparisonOp::Equal, 5, false);
        assert!(plain.can_do_bloom_filter());
        assert!(!plain.evaluate_bloom(&filter));
    }

    #[test]
    fn zone_map_always_true_when_page_is_covered() {
        let pred = predicate(ComparisonOp::LessThan, 100, false);
        let min = ScalarValue::Int64(1);
        let max = ScalarValue::Int64(50);
        assert!(pred.zone_map_always_true(min.as_ref(), max.as_ref()));
        assert!(pred.evaluate_del(min.as_ref(), max.as_ref()));
    }

    #[test]
    fn vectorized_flags_match_kernel() {
        let column = Int64Array::from(vec![Some(1), None, Some(8), Some(4)]);
        let pred = predicate(ComparisonOp::GreaterThan, 3, false);

        let mut flags = [false; 4];
        pred.evaluate_vec(&column, 4, &mut flags);
        assert_eq!(flags, [false, false, true, true]);

        let mut flags = [true; 4];
        let sel = [0u16, 1, 2, 3];
        pred.evaluate_and(&column, &sel, 4, &mut flags);
        assert_eq!(flags, [false, false, true, true]);

        let mut flags = [false; 4];
        pred.evaluate_or(&column, &sel, 4, &mut flags);
        assert_eq!(flags, [false, false, true, true]);
    }

    #[test]
    fn and_vec_narrows_preset_flags() {
        let pred = predicate(ComparisonOp::GreaterThan, 3, false);

        // Rows already rejected by an earlier predicate stay rejected.
        let column = Int64Array::from(vec![9, 9, 2, 9]);
        let mut flags = [true, false, true, true];
        pred.evaluate_and_vec(&column, 4, &mut flags);
        assert_eq!(flags, [true, false, false, true]);

        // Null rows never match on the null-map path.
        let nullable = Int64Array::from(vec![Some(9), None, Some(9), Some(1)]);
        let mut flags = [true; 4];
        pred.evaluate_and_vec(&nullable, 4, &mut flags);
        assert_eq!(flags, [true, false, true, false]);
    }

    #[test]
    fn bitmap_index_equal_and_ranges() {
        let mut index = MemoryBitmapIndex::new(
            vec![
                (ScalarValue::Int64(1), vec![0, 4]),
                (ScalarValue::Int64(3), vec![1]),
                (ScalarValue::Int64(5), vec![2, 5]),
                (ScalarValue::Int64(7), vec![3]),
            ],
            None,
        );

        let eq = predicate(ComparisonOp::Equal, 5, false);
        let rows = eq.evaluate_bitmap_index(&mut index, 6).unwrap();
        assert_eq!(rows.iter().collect::<Vec<_>>(), vec![2, 5]);

        let lt = predicate(ComparisonOp::LessThan, 5, false);
        let rows = lt.evaluate_bitmap_index(&mut index, 6).unwrap();
        assert_eq!(rows.iter().collect::<Vec<_>>(), vec![0, 1, 4]);

        let ne = predicate(ComparisonOp::NotEqual, 3, false);
        let rows = ne.evaluate_bitmap_index(&mut index, 6).unwrap();
        assert_eq!(rows.iter().collect::<Vec<_>>(), vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn bitmap_index_excludes_nulls_from_complements() {
        let mut index = MemoryBitmapIndex::new(
            vec![
                (ScalarValue::Int64(1), vec![0]),
                (ScalarValue::Int64(5), vec![1]),
            ],
            Some(vec![2]),
        );
        let ne = predicate(ComparisonOp::NotEqual, 5, false);
        let rows = ne.evaluate_bitmap_index(&mut index, 3).unwrap();
        assert_eq!(rows.iter().collect::<Vec<_>>(), vec![0]);
    }
}

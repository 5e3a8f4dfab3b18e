//! List-membership predicates over primitive and string columns.

use std::{collections::HashSet, hash::Hash, mem::discriminant};

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

/// Unions the bitmaps of every probe that hits the dictionary exactly.
fn union_exact_matches<'a>(
    iterator: &mut dyn BitmapIndexIterator,
    probes: impl Iterator<Item = ScalarValueRef<'a>>,
    out: &mut RoaringBitmap,
) -> Result<(), PredicateError> {
    for probe in probes {
        let seek = iterator.seek(probe)?;
        if seek.exact {
            iterator.union_bitmaps(seek.ordinal..seek.ordinal + 1, out)?;
        }
    }
    Ok(())
}

/// Membership predicate over a primitive column.
#[derive(Debug)]
pub struct InListPredicate<T: ArrowPrimitiveType>
where
    T::Native: Eq + Hash,
{
    base: PredicateBase,
    values: HashSet<T::Native>,
    probes: Vec<ScalarValue>,
    min_stat: ScalarValue,
    max_stat: ScalarValue,
    negated: bool,
    ignore_threshold: f64,
}

impl<T> InListPredicate<T>
where
    T: ArrowPrimitiveType,
    T::Native: NativeValue + Eq + Hash,
{
    /// Creates a membership predicate; `negated` yields `NOT IN` semantics.
    #[must_use]
    pub fn new(column_id: u32, values: Vec<T::Native>, negated: bool, opposite: bool) -> Self {
        let mut min = None;
        let mut max = None;
        for &value in &values {
            min = Some(match min {
                None => value,
                Some(current) => {
                    if value < current {
                        value
                    } else {
                        current
                    }
                }
            });
            max = Some(match max {
                None => value,
                Some(current) => {
                    if value > current {
                        value
                    } else {
                        current
                    }
                }
            });
        }
        let probes = values.iter().map(|v| v.to_scalar()).collect();
        Self {
            base: PredicateBase::new(column_id, opposite),
            values: values.into_iter().collect(),
            probes,
            min_stat: min.map_or(ScalarValue::Null, NativeValue::to_scalar),
            max_stat: max.map_or(ScalarValue::Null, NativeValue::to_scalar),
            negated,
            ignore_threshold: 0.0,
        }
    }

    /// Overrides the sampler's ignore threshold for this instance.
    #[must_use]
    pub fn with_ignore_threshold(mut self, threshold: f64) -> Self {
        self.ignore_threshold = threshold;
        self
    }

    fn matches(&self, candidate: T::Native) -> bool {
        self.values.contains(&candidate) != self.negated
    }

    /// Membership polarity after folding in the inversion flag. The pruning
    /// paths may rule a page out only when this is positive membership.
    fn excludes(&self) -> bool {
        self.negated != self.base.opposite()
    }
}

impl<T> ColumnPredicate for InListPredicate<T>
where
    T: ArrowPrimitiveType,
    T::Native: NativeValue + Eq + Hash,
{
    fn kind(&self) -> PredicateKind {
        if self.negated {
            PredicateKind::NotInList
        } else {
            PredicateKind::InList
        }
    }

    fn base(&self) -> &PredicateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PredicateBase {
        &mut self.base
    }

    fn can_do_apply_safely(&self, input_type: &DataType, _is_null: bool) -> bool {
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

    fn evaluate_and(&self, column: &dyn Array, sel: &[u16], size: u16, flags: &mut [bool]) {
        let array = column.as_primitive::<T>();
        let values = array.values();
        let opposite = self.base.opposite();
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => {
                for i in 0..usize::from(size) {
                    let idx = usize::from(sel[i]);
                    flags[i] &= opposite ^ (nulls.is_valid(idx) && self.matches(values[idx]));
                }
            }
            None => {
                for i in 0..usize::from(size) {
                    let idx = usize::from(sel[i]);
                    flags[i] &= opposite ^ self.matches(values[idx]);
                }
            }
        }
    }

    fn evaluate_or(&self, column: &dyn Array, sel: &[u16], size: u16, flags: &mut [bool]) {
        let array = column.as_primitive::<T>();
        let values = array.values();
        let opposite = self.base.opposite();
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => {
                for i in 0..usize::from(size) {
                    let idx = usize::from(sel[i]);
                    flags[i] |= opposite ^ (nulls.is_valid(idx) && self.matches(values[idx]));
                }
            }
            None => {
                for i in 0..usize::from(size) {
                    let idx = usize::from(sel[i]);
                    flags[i] |= opposite ^ self.matches(values[idx]);
                }
            }
        }
    }

    fn evaluate_zone_map(&self, min: ScalarValueRef<'_>, max: ScalarValueRef<'_>) -> bool {
        if self.excludes() {
            return true;
        }
        // The page overlaps the list's value range unless it sits entirely
        // below or above it.
        match (
            self.max_stat.as_ref().compare(min),
            self.min_stat.as_ref().compare(max),
        ) {
            (Some(hi), Some(lo)) => {
                !(hi == std::cmp::Ordering::Less || lo == std::cmp::Ordering::Greater)
            }
            _ => true,
        }
    }

    fn evaluate_bloom(&self, filter: &dyn BloomFilter) -> bool {
        if self.excludes() {
            return true;
        }
        self.probes
            .iter()
            .any(|probe| filter.maybe_contains(probe.as_ref()))
    }

    fn can_do_bloom_filter(&self) -> bool {
        !self.excludes()
    }

    fn evaluate_bitmap_index(
        &self,
        iterator: &mut dyn BitmapIndexIterator,
        num_rows: u32,
    ) -> Result<RoaringBitmap, PredicateError> {
        let mut matched = RoaringBitmap::new();
        union_exact_matches(iterator, self.probes.iter().map(ScalarValue::as_ref), &mut matched)?;
        if self.negated ^ self.base.opposite() {
            let nulls = read_null_bitmap(iterator)?;
            matched = complement_rows(matched, num_rows, nulls.as_ref());
        }
        Ok(matched)
    }

    fn ignore_threshold(&self) -> f64 {
        self.ignore_threshold
    }

    fn debug_inner(&self) -> String {
        format!(
            "in_list(negated={}, len={}, min={:?}, max={:?})",
            self.negated,
            self.values.len(),
            self.min_stat,
            self.max_stat
        )
    }
}

/// Membership predicate over a UTF-8 string column.
#[derive(Debug)]
pub struct StrInListPredicate {
    base: PredicateBase,
    values: HashSet<String>,
    min_stat: Option<String>,
    max_stat: Option<String>,
    negated: bool,
    ignore_threshold: f64,
}

impl StrInListPredicate {
    /// Creates a string membership predicate; `negated` yields `NOT IN`.
    #[must_use]
    pub fn new(column_id: u32, values: Vec<String>, negated: bool, opposite: bool) -> Self {
        let min_stat = values.iter().min().cloned();
        let max_stat = values.iter().max().cloned();
        Self {
            base: PredicateBase::new(column_id, opposite),
            values: values.into_iter().collect(),
            min_stat,
            max_stat,
            negated,
            ignore_threshold: 0.0,
        }
    }

    /// Overrides the sampler's ignore threshold for this instance.
    #[must_use]
    pub fn with_ignore_threshold(mut self, threshold: f64) -> Self {
        self.ignore_threshold = threshold;
        self
    }

    fn matches(&self, candidate: &str) -> bool {
        self.values.contains(candidate) != self.negated
    }

    /// Membership polarity after folding in the inversion flag. The pruning
    /// paths may rule a page out only when this is positive membership.
    fn excludes(&self) -> bool {
        self.negated != self.base.opposite()
    }
}

impl ColumnPredicate for StrInListPredicate {
    fn kind(&self) -> PredicateKind {
        if self.negated {
            PredicateKind::NotInList
        } else {
            PredicateKind::InList
        }
    }

    fn base(&self) -> &PredicateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PredicateBase {
        &mut self.base
    }

    fn can_do_apply_safely(&self, input_type: &DataType, _is_null: bool) -> bool {
        matches!(input_type, DataType::Utf8)
    }

    fn evaluate_inner(&self, column: &dyn Array, sel: &mut [u16], size: u16) -> u16 {
        let array = column.as_string::<i32>();
        let opposite = self.base.opposite();
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => compact_selection(array.len(), sel, size, |idx| {
                let idx = usize::from(idx);
                opposite ^ (nulls.is_valid(idx) && self.matches(array.value(idx)))
            }),
            None => compact_selection(array.len(), sel, size, |idx| {
                opposite ^ self.matches(array.value(usize::from(idx)))
            }),
        }
    }

    fn evaluate_zone_map(&self, min: ScalarValueRef<'_>, max: ScalarValueRef<'_>) -> bool {
        if self.excludes() {
            return true;
        }
        let (Some(list_min), Some(list_max)) = (&self.min_stat, &self.max_stat) else {
            return true;
        };
        match (
            ScalarValueRef::Utf8(list_max).compare(min),
            ScalarValueRef::Utf8(list_min).compare(max),
        ) {
            (Some(hi), Some(lo)) => {
                !(hi == std::cmp::Ordering::Less || lo == std::cmp::Ordering::Greater)
            }
            _ => true,
        }
    }

    fn evaluate_dict(&self, words: &[&str]) -> bool {
        if self.excludes() {
            return true;
        }
        words.iter().any(|word| self.values.contains(*word))
    }

    fn evaluate_bloom(&self, filter: &dyn BloomFilter) -> bool {
        if self.excludes() {
            return true;
        }
        self.values
            .iter()
            .any(|value| filter.maybe_contains(ScalarValueRef::Utf8(value)))
    }

    fn can_do_bloom_filter(&self) -> bool {
        !self.excludes()
    }

    fn evaluate_bitmap_index(
        &self,
        iterator: &mut dyn BitmapIndexIterator,
        num_rows: u32,
    ) -> Result<RoaringBitmap, PredicateError> {
        let mut matched = RoaringBitmap::new();
        union_exact_matches(
            iterator,
            self.values.iter().map(|value| ScalarValueRef::Utf8(value)),
            &mut matched,
        )?;
        if self.negated ^ self.base.opposite() {
            let nulls = read_null_bitmap(iterator)?;
            matched = complement_rows(matched, num_rows, nulls.as_ref());
        }
        Ok(matched)
    }

    fn ignore_threshold(&self) -> f64 {
        self.ignore_threshold
    }

    fn debug_inner(&self) -> String {
        format!("str_in_list(negated={}, len={})", self.negated, self.values.len())
    }
}

//! Bloom-filter predicate produced by runtime filters.

use std::{mem::discriminant, sync::Arc};

use arrow::{
    array::{Array, AsArray},
    datatypes::{ArrowPrimitiveType, DataType},
};
use roaring::RoaringBitmap;

use super::{compact_selection, ColumnPredicate, PredicateBase, PredicateKind};
use crate::{
    error::PredicateError,
    index::{BitmapIndexIterator, BloomFilter},
    scalar::NativeValue,
};

/// Predicate that keeps the rows an externally built bloom filter may
/// contain. False positives pass through by design; false negatives do not
/// exist, so rejected rows are safe to drop.
pub struct BloomFilterPredicate<T: ArrowPrimitiveType> {
    base: PredicateBase,
    filter: Arc<dyn BloomFilter>,
    ignore_threshold: f64,
    _marker: std::marker::PhantomData<T>,
}

impl<T> BloomFilterPredicate<T>
where
    T: ArrowPrimitiveType,
    T::Native: NativeValue,
{
    /// Wraps a bloom filter handed over by the runtime-filter machinery.
    #[must_use]
    pub fn new(column_id: u32, filter: Arc<dyn BloomFilter>) -> Self {
        Self {
            base: PredicateBase::new(column_id, false),
            filter,
            ignore_threshold: 0.0,
            _marker: std::marker::PhantomData,
        }
    }

    /// Overrides the sampler's ignore threshold for this instance.
    #[must_use]
    pub fn with_ignore_threshold(mut self, threshold: f64) -> Self {
        self.ignore_threshold = threshold;
        self
    }

    fn matches(&self, candidate: T::Native) -> bool {
        self.filter.maybe_contains(candidate.to_scalar().as_ref())
    }
}

impl<T> ColumnPredicate for BloomFilterPredicate<T>
where
    T: ArrowPrimitiveType,
    T::Native: NativeValue,
{
    fn kind(&self) -> PredicateKind {
        PredicateKind::BloomFilter
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
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => compact_selection(array.len(), sel, size, |idx| {
                let idx = usize::from(idx);
                nulls.is_valid(idx) && self.matches(values[idx])
            }),
            None => compact_selection(array.len(), sel, size, |idx| {
                self.matches(values[usize::from(idx)])
            }),
        }
    }

    fn support_zone_map(&self) -> bool {
        false
    }

    fn evaluate_bitmap_index(
        &self,
        _iterator: &mut dyn BitmapIndexIterator,
        num_rows: u32,
    ) -> Result<RoaringBitmap, PredicateError> {
        // A bloom filter cannot be replayed against a dictionary cheaply;
        // report the full candidate range instead of ruling rows out.
        let mut all = RoaringBitmap::new();
        all.insert_range(0..num_rows);
        Ok(all)
    }

    fn ignore_threshold(&self) -> f64 {
        self.ignore_threshold
    }

    fn debug_inner(&self) -> String {
        "bloom_filter".to_string()
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::Int64Array;
    use arrow::datatypes::Int64Type;

    use super::*;
    use crate::{scalar::ScalarValue, test_util::SetBloomFilter};

    #[test]
    fn keeps_rows_the_filter_may_contain() {
        let filter = Arc::new(SetBloomFilter::of(&[
            ScalarValue::Int64(5),
            ScalarValue::Int64(7),
        ]));
        let pred = BloomFilterPredicate::<Int64Type>::new(0, filter);
        let column = Int64Array::from(vec![Some(3), Some(5), None, Some(7)]);
        let mut sel = [0u16; 4];
        let survivors = pred.evaluate(&column, &mut sel, 4);
        assert_eq!(&sel[..usize::from(survivors)], &[1, 3]);
    }

    #[test]
    fn bitmap_index_path_is_conservative() {
        let filter = Arc::new(SetBloomFilter::of(&[ScalarValue::Int64(5)]));
        let pred = BloomFilterPredicate::<Int64Type>::new(0, filter);
        let mut index = crate::test_util::MemoryBitmapIndex::new(vec![], None);
        let rows = pred.evaluate_bitmap_index(&mut index, 4).unwrap();
        assert_eq!(rows.len(), 4);
    }
}

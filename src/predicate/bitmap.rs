//! Row-id bitmap predicate produced by runtime filters.

use arrow::{
    array::{Array, AsArray},
    datatypes::{DataType, UInt32Type},
};
use roaring::RoaringBitmap;

use super::{compact_selection, ColumnPredicate, PredicateBase, PredicateKind};
use crate::{error::PredicateError, index::BitmapIndexIterator};

/// Predicate that keeps the rows whose global row id is a member of a
/// precomputed bitmap.
///
/// Unlike the other runtime-filter products, a bitmap filter is exact: it is
/// always a runtime filter but can never be skipped, so it opts out of the
/// selectivity sampler.
#[derive(Debug)]
pub struct BitmapFilterPredicate {
    base: PredicateBase,
    bitmap: RoaringBitmap,
}

impl BitmapFilterPredicate {
    /// Wraps a row-id bitmap over a `UInt32` row-id column.
    #[must_use]
    pub fn new(column_id: u32, bitmap: RoaringBitmap) -> Self {
        Self {
            base: PredicateBase::new(column_id, false),
            bitmap,
        }
    }
}

impl ColumnPredicate for BitmapFilterPredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::BitmapFilter
    }

    fn base(&self) -> &PredicateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PredicateBase {
        &mut self.base
    }

    fn can_do_apply_safely(&self, input_type: &DataType, _is_null: bool) -> bool {
        matches!(input_type, DataType::UInt32)
    }

    fn evaluate_inner(&self, column: &dyn Array, sel: &mut [u16], size: u16) -> u16 {
        let array = column.as_primitive::<UInt32Type>();
        let values = array.values();
        match array.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => compact_selection(array.len(), sel, size, |idx| {
                let idx = usize::from(idx);
                nulls.is_valid(idx) && self.bitmap.contains(values[idx])
            }),
            None => compact_selection(array.len(), sel, size, |idx| {
                self.bitmap.contains(values[usize::from(idx)])
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
        // The filter already is a row-id set; clip it to the rowset.
        let mut rows = self.bitmap.clone();
        rows.remove_range(num_rows..);
        Ok(rows)
    }

    // Exact row membership must never be sampled away.
    fn can_ignore(&self) -> bool {
        false
    }

    fn is_runtime_filter(&self) -> bool {
        true
    }

    fn debug_inner(&self) -> String {
        format!("bitmap_filter(len={})", self.bitmap.len())
    }
}

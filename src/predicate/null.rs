//! Null-check predicates driven entirely by the column's null map.

use arrow::{array::Array, datatypes::DataType};
use roaring::RoaringBitmap;

use super::{compact_selection, complement_rows, ColumnPredicate, PredicateBase, PredicateKind};
use crate::{error::PredicateError, index::BitmapIndexIterator};

/// `IS NULL` / `IS NOT NULL` predicate.
///
/// Works on any physical column type: only the null map is consulted.
#[derive(Debug)]
pub struct NullPredicate {
    base: PredicateBase,
    is_null: bool,
}

impl NullPredicate {
    /// Creates a null check; `is_null = false` yields `IS NOT NULL`.
    #[must_use]
    pub fn new(column_id: u32, is_null: bool, opposite: bool) -> Self {
        Self {
            base: PredicateBase::new(column_id, opposite),
            is_null,
        }
    }
}

impl ColumnPredicate for NullPredicate {
    fn kind(&self) -> PredicateKind {
        if self.is_null {
            PredicateKind::IsNull
        } else {
            PredicateKind::IsNotNull
        }
    }

    fn base(&self) -> &PredicateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PredicateBase {
        &mut self.base
    }

    fn can_do_apply_safely(&self, _input_type: &DataType, _is_null: bool) -> bool {
        true
    }

    fn evaluate_inner(&self, column: &dyn Array, sel: &mut [u16], size: u16) -> u16 {
        let opposite = self.base.opposite();
        match column.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => compact_selection(column.len(), sel, size, |idx| {
                opposite ^ (nulls.is_null(usize::from(idx)) == self.is_null)
            }),
            // No null map: the verdict is the same for every row, so the
            // selection vector passes through or empties wholesale.
            None => {
                if opposite ^ !self.is_null {
                    size
                } else {
                    0
                }
            }
        }
    }

    fn evaluate_vec(&self, column: &dyn Array, size: u16, flags: &mut [bool]) {
        let opposite = self.base.opposite();
        match column.nulls().filter(|nulls| nulls.null_count() > 0) {
            Some(nulls) => {
                for (i, flag) in flags.iter_mut().enumerate().take(usize::from(size)) {
                    *flag = opposite ^ (nulls.is_null(i) == self.is_null);
                }
            }
            None => {
                let verdict = opposite ^ !self.is_null;
                for flag in flags.iter_mut().take(usize::from(size)) {
                    *flag = verdict;
                }
            }
        }
    }

    fn support_zone_map(&self) -> bool {
        // The statistics pair carries no null counts.
        false
    }

    fn evaluate_bitmap_index(
        &self,
        iterator: &mut dyn BitmapIndexIterator,
        num_rows: u32,
    ) -> Result<RoaringBitmap, PredicateError> {
        let mut nulls = RoaringBitmap::new();
        if iterator.has_null_bitmap() {
            iterator.null_bitmap(&mut nulls)?;
        }
        let want_null = self.is_null != self.base.opposite();
        if want_null {
            Ok(nulls)
        } else {
            Ok(complement_rows(nulls, num_rows, None))
        }
    }

    fn debug_inner(&self) -> String {
        format!("null_check(is_null={})", self.is_null)
    }
}

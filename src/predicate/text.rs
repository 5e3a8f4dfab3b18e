//! Full-text match predicate.

use arrow::{
    array::{Array, AsArray},
    datatypes::DataType,
};
use roaring::RoaringBitmap;

use super::{compact_selection, complement_rows, ColumnPredicate, PredicateBase, PredicateKind};
use crate::{
    error::PredicateError,
    index::{BitmapIndexIterator, TextIndexIterator},
};

/// Term-match predicate over UTF-8 columns.
///
/// The inverted index is the intended evaluation path; the column kernel is
/// a plain substring containment fallback for rows the index cannot answer.
#[derive(Debug)]
pub struct MatchPredicate {
    base: PredicateBase,
    term: String,
}

impl MatchPredicate {
    /// Creates a match predicate for `term`.
    #[must_use]
    pub fn new(column_id: u32, term: String, opposite: bool) -> Self {
        Self {
            base: PredicateBase::new(column_id, opposite),
            term,
        }
    }

    /// The queried term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }
}

impl ColumnPredicate for MatchPredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Match
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
                opposite ^ (nulls.is_valid(idx) && array.value(idx).contains(&self.term))
            }),
            None => compact_selection(array.len(), sel, size, |idx| {
                opposite ^ array.value(usize::from(idx)).contains(&self.term)
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
        // Dictionary equality is not match semantics; report the full
        // candidate range instead of mispruning.
        let mut all = RoaringBitmap::new();
        all.insert_range(0..num_rows);
        Ok(all)
    }

    fn evaluate_text_index(
        &self,
        iterator: &mut dyn TextIndexIterator,
        num_rows: u32,
    ) -> Result<RoaringBitmap, PredicateError> {
        let mut matched = RoaringBitmap::new();
        iterator.match_term(&self.term, &mut matched)?;
        if self.base.opposite() {
            // The index reports no null information; the complement spans
            // the whole rowset.
            matched = complement_rows(matched, num_rows, None);
        }
        Ok(matched)
    }

    fn debug_inner(&self) -> String {
        format!("match(term={:?})", self.term)
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::StringArray;

    use super::*;
    use crate::test_util::MemoryTextIndex;

    #[test]
    fn column_fallback_matches_substrings() {
        let column = StringArray::from(vec![
            Some("hello world"),
            Some("rust"),
            None,
            Some("world peace"),
        ]);
        let pred = MatchPredicate::new(0, "world".to_string(), false);
        let mut sel = [0u16; 4];
        let survivors = pred.evaluate(&column, &mut sel, 4);
        assert_eq!(&sel[..usize::from(survivors)], &[0, 3]);
    }

    #[test]
    fn text_index_path_returns_posting_rows() {
        let mut index = MemoryTextIndex::new(vec![("world".to_string(), vec![0, 3])]);
        let pred = MatchPredicate::new(0, "world".to_string(), false);
        let rows = pred.evaluate_text_index(&mut index, 4).unwrap();
        assert_eq!(rows.iter().collect::<Vec<_>>(), vec![0, 3]);

        let missing = MatchPredicate::new(0, "absent".to_string(), false);
        let rows = missing.evaluate_text_index(&mut index, 4).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn non_text_predicates_reject_the_text_path() {
        use arrow::datatypes::Int64Type;

        use crate::predicate::comparison::{ComparisonOp, ComparisonPredicate};

        let pred = ComparisonPredicate::<Int64Type>::new(0, ComparisonOp::Equal, 5i64, false);
        let mut index = MemoryTextIndex::new(vec![]);
        let err = pred.evaluate_text_index(&mut index, 4).unwrap_err();
        assert!(matches!(err, PredicateError::NotSupported { .. }));
    }
}

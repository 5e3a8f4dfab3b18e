//! In-memory index and filter fakes shared across unit tests.

use std::{cmp::Ordering, collections::HashMap, ops::Range};

use roaring::RoaringBitmap;

use crate::{
    error::PredicateError,
    index::{BitmapIndexIterator, BloomFilter, SeekResult, TextIndexIterator},
    scalar::{ScalarValue, ScalarValueRef},
};

/// Bitmap index backed by a sorted in-memory dictionary.
pub(crate) struct MemoryBitmapIndex {
    entries: Vec<(ScalarValue, RoaringBitmap)>,
    nulls: Option<RoaringBitmap>,
}

impl MemoryBitmapIndex {
    /// `entries` must be sorted ascending by value.
    pub(crate) fn new(entries: Vec<(ScalarValue, Vec<u32>)>, nulls: Option<Vec<u32>>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(value, rows)| (value, rows.into_iter().collect()))
                .collect(),
            nulls: nulls.map(|rows| rows.into_iter().collect()),
        }
    }
}

impl BitmapIndexIterator for MemoryBitmapIndex {
    fn dictionary_len(&self) -> u32 {
        self.entries.len() as u32
    }

    fn has_null_bitmap(&self) -> bool {
        self.nulls.is_some()
    }

    fn seek(&mut self, probe: ScalarValueRef<'_>) -> Result<SeekResult, PredicateError> {
        for (ordinal, (value, _)) in self.entries.iter().enumerate() {
            match value.as_ref().compare(probe) {
                Some(Ordering::Equal) => {
                    return Ok(SeekResult {
                        ordinal: ordinal as u32,
                        exact: true,
                    })
                }
                Some(Ordering::Greater) => {
                    return Ok(SeekResult {
                        ordinal: ordinal as u32,
                        exact: false,
                    })
                }
                Some(Ordering::Less) => {}
                None => return Err(PredicateError::index("probe type mismatch")),
            }
        }
        Ok(SeekResult {
            ordinal: self.dictionary_len(),
            exact: false,
        })
    }

    fn union_bitmaps(
        &mut self,
        ordinals: Range<u32>,
        out: &mut RoaringBitmap,
    ) -> Result<(), PredicateError> {
        for ordinal in ordinals {
            let (_, rows) = self
                .entries
                .get(ordinal as usize)
                .ok_or_else(|| PredicateError::index("ordinal out of range"))?;
            *out |= rows;
        }
        Ok(())
    }

    fn null_bitmap(&mut self, out: &mut RoaringBitmap) -> Result<(), PredicateError> {
        match &self.nulls {
            Some(nulls) => {
                *out |= nulls;
                Ok(())
            }
            None => Err(PredicateError::index("index has no null bitmap")),
        }
    }
}

/// Exact-membership stand-in for a bloom filter. No false positives either,
/// which keeps test expectations deterministic.
pub(crate) struct SetBloomFilter {
    values: Vec<ScalarValue>,
}

impl SetBloomFilter {
    pub(crate) fn of(values: &[ScalarValue]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl BloomFilter for SetBloomFilter {
    fn maybe_contains(&self, probe: ScalarValueRef<'_>) -> bool {
        self.values
            .iter()
            .any(|value| value.as_ref().compare(probe) == Some(Ordering::Equal))
    }
}

/// Inverted index backed by a preset term-to-rows map.
pub(crate) struct MemoryTextIndex {
    postings: HashMap<String, RoaringBitmap>,
}

impl MemoryTextIndex {
    pub(crate) fn new(postings: Vec<(String, Vec<u32>)>) -> Self {
        Self {
            postings: postings
                .into_iter()
                .map(|(term, rows)| (term, rows.into_iter().collect()))
                .collect(),
        }
    }
}

impl TextIndexIterator for MemoryTextIndex {
    fn match_term(&mut self, term: &str, out: &mut RoaringBitmap) -> Result<(), PredicateError> {
        if let Some(rows) = self.postings.get(term) {
            *out |= rows;
        }
        Ok(())
    }
}

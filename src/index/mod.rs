//! External index collaborator contracts.
//!
//! The predicate core never parses on-disk index structures; it consumes
//! their query interfaces through these traits. Failures cross the boundary
//! as [`PredicateError`] values, never as panics.

use std::ops::Range;

use roaring::RoaringBitmap;

use crate::{error::PredicateError, scalar::ScalarValueRef};

/// Position of a probe value within an ordered dictionary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeekResult {
    /// Ordinal of the first dictionary entry that is `>=` the probe.
    ///
    /// Equals the dictionary length when the probe is greater than every
    /// entry.
    pub ordinal: u32,
    /// True when the entry at `ordinal` equals the probe exactly.
    pub exact: bool,
}

/// Query interface of a bitmap index: an ordered dictionary plus one row-id
/// bitmap per distinct value.
pub trait BitmapIndexIterator {
    /// Number of distinct values in the dictionary.
    fn dictionary_len(&self) -> u32;

    /// True when the index tracks a dedicated bitmap of null rows.
    fn has_null_bitmap(&self) -> bool;

    /// Locates the probe within the dictionary.
    fn seek(&mut self, probe: ScalarValueRef<'_>) -> Result<SeekResult, PredicateError>;

    /// Unions the bitmaps of the given ordinal range into `out`.
    fn union_bitmaps(
        &mut self,
        ordinals: Range<u32>,
        out: &mut RoaringBitmap,
    ) -> Result<(), PredicateError>;

    /// Reads the null-row bitmap into `out`.
    fn null_bitmap(&mut self, out: &mut RoaringBitmap) -> Result<(), PredicateError>;
}

/// Query interface of an inverted full-text index.
pub trait TextIndexIterator {
    /// Collects the rows whose indexed text matches `term` into `out`.
    fn match_term(&mut self, term: &str, out: &mut RoaringBitmap) -> Result<(), PredicateError>;
}

/// Membership-test interface of a bloom filter. No false negatives.
pub trait BloomFilter {
    /// Returns false only when the probed value is certainly absent.
    fn maybe_contains(&self, probe: ScalarValueRef<'_>) -> bool;
}

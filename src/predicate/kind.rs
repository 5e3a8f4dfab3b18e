//! Closed taxonomy of predicate kinds and their classification queries.

use std::fmt;

/// Kind tag of a column predicate, immutable per predicate instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    /// Unclassified predicate.
    #[default]
    Unknown,
    /// Equality (`=`).
    Eq,
    /// Inequality (`!=`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
    /// Membership in a literal list.
    InList,
    /// Negated membership in a literal list.
    NotInList,
    /// Null check.
    IsNull,
    /// Non-null check.
    IsNotNull,
    /// Bloom-filter membership (runtime filter product).
    BloomFilter,
    /// Row-id bitmap membership (runtime filter product).
    BitmapFilter,
    /// Full-text match.
    Match,
}

impl PredicateKind {
    /// True for the four strict/inclusive ordering comparisons.
    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(
            self,
            PredicateKind::Lt | PredicateKind::Le | PredicateKind::Gt | PredicateKind::Ge
        )
    }

    /// True for the bloom-filter kind.
    #[must_use]
    pub const fn is_bloom_filter(self) -> bool {
        matches!(self, PredicateKind::BloomFilter)
    }

    /// True for list-membership kinds.
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, PredicateKind::InList | PredicateKind::NotInList)
    }

    /// True for equality and positive list membership.
    #[must_use]
    pub const fn is_equal_or_list(self) -> bool {
        matches!(self, PredicateKind::Eq | PredicateKind::InList)
    }

    /// True for the six binary comparisons.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            PredicateKind::Eq
                | PredicateKind::Ne
                | PredicateKind::Lt
                | PredicateKind::Le
                | PredicateKind::Gt
                | PredicateKind::Ge
        )
    }

    /// Stable diagnostic token for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PredicateKind::Eq => "eq",
            PredicateKind::Ne => "ne",
            PredicateKind::Lt => "lt",
            PredicateKind::Le => "le",
            PredicateKind::Gt => "gt",
            PredicateKind::Ge => "ge",
            PredicateKind::InList => "in",
            PredicateKind::NotInList => "not_in",
            PredicateKind::IsNull => "is_null",
            PredicateKind::IsNotNull => "is_not_null",
            PredicateKind::BloomFilter => "bf",
            PredicateKind::BitmapFilter => "bitmap",
            PredicateKind::Match => "match",
            PredicateKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::PredicateKind::*;

    #[test]
    fn classification_truth_table() {
        for kind in [Lt, Le, Gt, Ge] {
            assert!(kind.is_range());
            assert!(kind.is_comparison());
            assert!(!kind.is_list());
        }
        for kind in [Eq, Ne] {
            assert!(kind.is_comparison());
            assert!(!kind.is_range());
        }
        for kind in [InList, NotInList] {
            assert!(kind.is_list());
            assert!(!kind.is_comparison());
        }
        assert!(Eq.is_equal_or_list());
        assert!(InList.is_equal_or_list());
        assert!(!NotInList.is_equal_or_list());
        assert!(BloomFilter.is_bloom_filter());
        for kind in [IsNull, IsNotNull, BitmapFilter, Match, Unknown] {
            assert!(!kind.is_comparison());
            assert!(!kind.is_range());
            assert!(!kind.is_list());
        }
    }

    #[test]
    fn rendering_is_stable() {
        assert_eq!(Eq.to_string(), "eq");
        assert_eq!(NotInList.to_string(), "not_in");
        assert_eq!(Unknown.to_string(), "unknown");
    }
}

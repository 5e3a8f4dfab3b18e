//! Error types for predicate evaluation paths.

use thiserror::Error;

use crate::predicate::PredicateKind;

/// Errors raised by the statistics and index evaluation paths.
///
/// These are expected, recoverable outcomes: a caller receiving
/// [`PredicateError::NotSupported`] falls back to column-level evaluation.
/// Invariant violations inside kernels are panics, not error values.
#[derive(Debug, Error)]
pub enum PredicateError {
    /// The evaluation path is not implemented by this predicate variant.
    #[error("{operation} is not supported by {kind} predicate")]
    NotSupported {
        /// Kind of the predicate that was asked.
        kind: PredicateKind,
        /// Human-readable name of the rejected operation.
        operation: &'static str,
    },
    /// An index collaborator reported a failure.
    #[error("index evaluation failed: {0}")]
    Index(String),
}

impl PredicateError {
    /// Builds a `NotSupported` error for the given kind and operation.
    #[must_use]
    pub fn not_supported(kind: PredicateKind, operation: &'static str) -> Self {
        Self::NotSupported { kind, operation }
    }

    /// Builds an index failure from a collaborator message.
    #[must_use]
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }
}

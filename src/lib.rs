//! Columnar predicate evaluation over Arrow arrays.
//!
//! `sift` is the filtering core of a columnar scan: predicates compact a
//! selection vector of row offsets against a column batch, and the same
//! predicate objects answer the cheaper pre-filter questions a scan asks
//! before touching column data: zone-map (min/max) pruning, bloom-filter
//! probes, dictionary checks and bitmap/inverted-index evaluation.
//!
//! Predicates produced by runtime filters additionally sample their own
//! selectivity and disable themselves for the rest of the scan once they
//! stop filtering enough rows to pay for their cost.
//!
//! ```
//! use arrow::array::Int64Array;
//! use arrow::datatypes::Int64Type;
//! use sift::predicate::comparison::{ComparisonOp, ComparisonPredicate};
//! use sift::ColumnPredicate;
//!
//! let pred = ComparisonPredicate::<Int64Type>::new(0, ComparisonOp::GreaterThan, 4i64, false);
//! let column = Int64Array::from(vec![3, 5, 2, 9]);
//! let mut sel = [0u16, 1, 2, 3];
//! let survivors = pred.evaluate(&column, &mut sel, 4);
//! assert_eq!(&sel[..usize::from(survivors)], &[1, 3]);
//! ```
#![deny(missing_docs)]

pub mod decode;
pub mod error;
pub mod index;
pub mod predicate;
pub mod scalar;
pub mod value;

mod logging;
#[cfg(test)]
mod test_util;

pub use decode::{decode_stat, StatType};
pub use error::PredicateError;
pub use predicate::{ColumnPredicate, PredicateBase, PredicateKind, ProfileCounter, SamplerConfig};
pub use scalar::{NativeValue, ScalarValue, ScalarValueRef};
pub use value::{DateTimeValue, DecimalError, DecimalValue};

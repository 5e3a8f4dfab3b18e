//! Native comparison value types with storage-defined decode contracts.

pub mod datetime;
pub mod decimal;

pub use datetime::DateTimeValue;
pub use decimal::{DecimalError, DecimalValue};

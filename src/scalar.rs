//! Dynamically typed comparison values shared across evaluation paths.
//!
//! Predicates are generic over their column's native type on the hot path,
//! but the statistics, bloom and index contracts are dynamically typed.
//! [`ScalarValue`] is the bridge: a closed set of value families with a
//! partial comparison that returns `None` across families or against `Null`.

use std::cmp::Ordering;

use crate::value::{DateTimeValue, DecimalValue};

/// Owned dynamically typed comparison value.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    /// Represents SQL `NULL`.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Binary blob.
    Binary(Vec<u8>),
    /// Fixed-point decimal, scale 9.
    Decimal(DecimalValue),
    /// Calendar date/time.
    DateTime(DateTimeValue),
}

impl ScalarValue {
    /// Returns true when the value is the `Null` variant.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Compares this value with another, when both sides are comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        self.as_ref().compare(other.as_ref())
    }

    /// Returns a borrowed view over this value.
    #[must_use]
    pub fn as_ref(&self) -> ScalarValueRef<'_> {
        match self {
            ScalarValue::Null => ScalarValueRef::Null,
            ScalarValue::Boolean(value) => ScalarValueRef::Boolean(*value),
            ScalarValue::Int64(value) => ScalarValueRef::Int64(*value),
            ScalarValue::UInt64(value) => ScalarValueRef::UInt64(*value),
            ScalarValue::Float64(value) => ScalarValueRef::Float64(*value),
            ScalarValue::Utf8(value) => ScalarValueRef::Utf8(value.as_str()),
            ScalarValue::Binary(value) => ScalarValueRef::Binary(value.as_slice()),
            ScalarValue::Decimal(value) => ScalarValueRef::Decimal(*value),
            ScalarValue::DateTime(value) => ScalarValueRef::DateTime(*value),
        }
    }
}

/// Borrowed view over a [`ScalarValue`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarValueRef<'a> {
    /// Represents SQL `NULL`.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string slice.
    Utf8(&'a str),
    /// Binary slice.
    Binary(&'a [u8]),
    /// Fixed-point decimal, scale 9.
    Decimal(DecimalValue),
    /// Calendar date/time.
    DateTime(DateTimeValue),
}

impl<'a> ScalarValueRef<'a> {
    /// Returns true when the value is the `Null` variant.
    #[must_use]
    pub fn is_null(self) -> bool {
        matches!(self, ScalarValueRef::Null)
    }

    /// Compares this value with another, when both sides are comparable.
    pub fn compare(self, other: ScalarValueRef<'_>) -> Option<Ordering> {
        use ScalarValueRef::*;
        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Boolean(lhs), Boolean(rhs)) => Some(lhs.cmp(&rhs)),
            (Int64(lhs), Int64(rhs)) => Some(lhs.cmp(&rhs)),
            (UInt64(lhs), UInt64(rhs)) => Some(lhs.cmp(&rhs)),
            (Float64(lhs), Float64(rhs)) => lhs.partial_cmp(&rhs),
            (Utf8(lhs), Utf8(rhs)) => Some(lhs.cmp(rhs)),
            (Binary(lhs), Binary(rhs)) => Some(lhs.cmp(rhs)),
            (Decimal(lhs), Decimal(rhs)) => Some(lhs.cmp(&rhs)),
            (DateTime(lhs), DateTime(rhs)) => Some(lhs.cmp(&rhs)),
            _ => None,
        }
    }

    /// Signed integer view.
    #[must_use]
    pub fn as_int_i64(self) -> Option<i64> {
        match self {
            ScalarValueRef::Int64(value) => Some(value),
            _ => None,
        }
    }

    /// Unsigned integer view.
    #[must_use]
    pub fn as_uint_u64(self) -> Option<u64> {
        match self {
            ScalarValueRef::UInt64(value) => Some(value),
            _ => None,
        }
    }

    /// Floating-point view.
    #[must_use]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            ScalarValueRef::Float64(value) => Some(value),
            _ => None,
        }
    }

    /// String view.
    #[must_use]
    pub fn as_utf8(self) -> Option<&'a str> {
        match self {
            ScalarValueRef::Utf8(value) => Some(value),
            _ => None,
        }
    }

    /// Decimal view.
    #[must_use]
    pub fn as_decimal(self) -> Option<DecimalValue> {
        match self {
            ScalarValueRef::Decimal(value) => Some(value),
            _ => None,
        }
    }

    /// Date/time view.
    #[must_use]
    pub fn as_datetime(self) -> Option<DateTimeValue> {
        match self {
            ScalarValueRef::DateTime(value) => Some(value),
            _ => None,
        }
    }
}

impl<'a> From<&'a ScalarValue> for ScalarValueRef<'a> {
    fn from(value: &'a ScalarValue) -> Self {
        value.as_ref()
    }
}

/// Column native types that can cross the dynamically typed boundary.
///
/// The hot-path kernels compare natives directly; the statistics and index
/// paths convert through [`ScalarValue`]. `from_scalar` returns `None` on a
/// family or range mismatch, which evaluation paths treat conservatively.
pub trait NativeValue: Copy + PartialOrd {
    /// Converts the native into its scalar representation.
    fn to_scalar(self) -> ScalarValue;

    /// Recovers the native from a scalar view, when it fits.
    fn from_scalar(value: ScalarValueRef<'_>) -> Option<Self>;
}

macro_rules! impl_native_signed {
    ($($native:ty),*) => {
        $(
            impl NativeValue for $native {
                fn to_scalar(self) -> ScalarValue {
                    ScalarValue::Int64(i64::from(self))
                }

                fn from_scalar(value: ScalarValueRef<'_>) -> Option<Self> {
                    if let Some(v) = value.as_int_i64() {
                        return Self::try_from(v).ok();
                    }
                    if let Some(v) = value.as_uint_u64() {
                        return Self::try_from(v).ok();
                    }
                    None
                }
            }
        )*
    };
}

macro_rules! impl_native_unsigned {
    ($($native:ty),*) => {
        $(
            impl NativeValue for $native {
                fn to_scalar(self) -> ScalarValue {
                    ScalarValue::UInt64(u64::from(self))
                }

                fn from_scalar(value: ScalarValueRef<'_>) -> Option<Self> {
                    if let Some(v) = value.as_uint_u64() {
                        return Self::try_from(v).ok();
                    }
                    if let Some(v) = value.as_int_i64() {
                        return Self::try_from(v).ok();
                    }
                    None
                }
            }
        )*
    };
}

impl_native_signed!(i8, i16, i32, i64);
impl_native_unsigned!(u8, u16, u32, u64);

impl NativeValue for f32 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Float64(f64::from(self))
    }

    fn from_scalar(value: ScalarValueRef<'_>) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

impl NativeValue for f64 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Float64(self)
    }

    fn from_scalar(value: ScalarValueRef<'_>) -> Option<Self> {
        value.as_f64()
    }
}

// Decimal128 columns carry scaled i128 natives.
impl NativeValue for i128 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Decimal(DecimalValue::from_raw(self))
    }

    fn from_scalar(value: ScalarValueRef<'_>) -> Option<Self> {
        value.as_decimal().map(DecimalValue::raw)
    }
}

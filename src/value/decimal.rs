//! Signed fixed-point decimal with a fixed scale of nine fractional digits.
//!
//! The storage format splits a value into an integer part and a fractional
//! part; both are re-joined here into a single scaled `i128`. Arithmetic that
//! could leave the representable range must fail loudly instead of wrapping.

use std::fmt;

use thiserror::Error;

/// Number of scaled units per whole unit (nine fractional digits).
const SCALE: i128 = 1_000_000_000;

/// Largest representable scaled magnitude: 18 integer digits, 9 fractional.
const MAX_RAW: i128 = 999_999_999_999_999_999 * SCALE + (SCALE - 1);

/// Errors raised by decimal arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum DecimalError {
    /// The mathematical product left the representable range.
    ///
    /// `intermediate` carries the scaled product when it fits in `i128`;
    /// it is `None` when even the raw multiplication overflowed.
    #[error("decimal multiply overflow: {lhs} * {rhs}")]
    MultiplyOverflow {
        /// Left operand.
        lhs: DecimalValue,
        /// Right operand.
        rhs: DecimalValue,
        /// Scaled product, when representable at all.
        intermediate: Option<i128>,
    },
}

/// Signed fixed-point value, scale 9, backed by a scaled `i128`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecimalValue {
    raw: i128,
}

impl DecimalValue {
    /// Builds a value from its storage components: integer part and
    /// nine-digit fractional part. Both components carry the sign.
    #[must_use]
    pub fn from_parts(integer: i64, fraction: i32) -> Self {
        Self {
            raw: i128::from(integer) * SCALE + i128::from(fraction),
        }
    }

    /// Builds a value directly from a scaled `i128`.
    #[must_use]
    pub fn from_raw(raw: i128) -> Self {
        Self { raw }
    }

    /// Returns the scaled representation.
    #[must_use]
    pub fn raw(self) -> i128 {
        self.raw
    }

    /// Splits the value back into its storage components.
    ///
    /// Truncation is toward zero, so both components carry the sign and
    /// `from_parts` reproduces the value exactly.
    #[must_use]
    pub fn to_parts(self) -> (i64, i32) {
        ((self.raw / SCALE) as i64, (self.raw % SCALE) as i32)
    }

    /// Multiplies two values, failing when the mathematical product leaves
    /// the representable range.
    ///
    /// The double-scaled product rounds away from zero back to scale 9, so
    /// any nonzero mathematical product stays nonzero and a product past the
    /// decimal maximum cannot round down into range. A raw `i128` overflow
    /// or a rounded product beyond the decimal min/max both report
    /// [`DecimalError::MultiplyOverflow`] rather than wrapping.
    pub fn checked_mul(self, rhs: Self) -> Result<Self, DecimalError> {
        let Some(product) = self.raw.checked_mul(rhs.raw) else {
            return Err(DecimalError::MultiplyOverflow {
                lhs: self,
                rhs,
                intermediate: None,
            });
        };
        let sign = product.signum();
        let scaled = (product - sign) / SCALE + sign;
        if scaled > MAX_RAW || scaled < -MAX_RAW {
            return Err(DecimalError::MultiplyOverflow {
                lhs: self,
                rhs,
                intermediate: Some(scaled),
            });
        }
        Ok(Self::from_raw(scaled))
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (integer, fraction) = self.to_parts();
        if self.raw < 0 && integer == 0 {
            write!(f, "-0.{:09}", fraction.unsigned_abs())
        } else {
            write!(f, "{}.{:09}", integer, fraction.unsigned_abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_round_trip() {
        let value = DecimalValue::from_parts(42, 500_000_000);
        assert_eq!(value.to_parts(), (42, 500_000_000));

        let negative = DecimalValue::from_parts(-3, -250_000_000);
        assert_eq!(negative.to_parts(), (-3, -250_000_000));
        assert!(negative < value);
    }

    #[test]
    fn display_renders_fixed_scale() {
        assert_eq!(DecimalValue::from_parts(2, 500_000_000).to_string(), "2.500000000");
        assert_eq!(DecimalValue::from_parts(0, -1).to_string(), "-0.000000001");
    }

    #[test]
    fn multiply_scales_correctly() {
        let lhs = DecimalValue::from_parts(2, 500_000_000);
        let rhs = DecimalValue::from_parts(4, 0);
        assert_eq!(lhs.checked_mul(rhs), Ok(DecimalValue::from_parts(10, 0)));
    }

    #[test]
    fn multiply_rounds_away_from_zero() {
        // The smallest positive product must not vanish to zero.
        let epsilon = DecimalValue::from_raw(1);
        assert_eq!(epsilon.checked_mul(epsilon), Ok(DecimalValue::from_raw(1)));

        let negative = DecimalValue::from_raw(-1);
        assert_eq!(negative.checked_mul(epsilon), Ok(DecimalValue::from_raw(-1)));

        // Exact multiples stay exact.
        let lhs = DecimalValue::from_parts(0, 500_000_000);
        let rhs = DecimalValue::from_parts(0, 200_000_000);
        assert_eq!(lhs.checked_mul(rhs), Ok(DecimalValue::from_parts(0, 100_000_000)));
    }

    #[test]
    fn multiply_just_past_maximum_cannot_round_into_range() {
        // A mathematical product a hair above the maximum rounds up to
        // MAX + 1 scaled units and must be rejected, not accepted as MAX.
        let max = DecimalValue::from_raw(999_999_999_999_999_999 * 1_000_000_000 + 999_999_999);
        let just_over = DecimalValue::from_raw(1_000_000_001);
        let one = DecimalValue::from_raw(1_000_000_000);
        assert!(max.checked_mul(one).is_ok());
        match max.checked_mul(just_over) {
            Err(DecimalError::MultiplyOverflow { intermediate, .. }) => {
                assert!(intermediate.is_some());
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn multiply_of_maximum_values_overflows() {
        // 999999999999999999.999999999 squared: even the raw i128 product
        // overflows, so no intermediate is representable.
        let max = DecimalValue::from_parts(999_999_999_999_999_999, 999_999_999);
        match max.checked_mul(max) {
            Err(DecimalError::MultiplyOverflow {
                lhs,
                rhs,
                intermediate,
            }) => {
                assert_eq!(lhs, max);
                assert_eq!(rhs, max);
                assert_eq!(intermediate, None);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn multiply_past_decimal_range_reports_intermediate() {
        // The raw product fits in i128 but the scaled result exceeds the
        // decimal maximum, so the offending intermediate is carried.
        let max = DecimalValue::from_parts(999_999_999_999_999_999, 999_999_999);
        let two = DecimalValue::from_parts(2, 0);
        match max.checked_mul(two) {
            Err(DecimalError::MultiplyOverflow { intermediate, .. }) => {
                assert!(intermediate.is_some());
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }
}

//! Decoding of fixed-size statistics byte runs into comparison values.
//!
//! Zone-map pages store each column's min/max as a fixed-size encoded run.
//! Three representation families need dedicated handling; everything else is
//! a plain little-endian reinterpretation. The run's length is guaranteed by
//! the column format, so no length validation happens here.

use crate::{
    scalar::ScalarValue,
    value::{DateTimeValue, DecimalValue},
};

/// Logical primitive type of an encoded statistics value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatType {
    /// Single-byte boolean.
    Boolean,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Packed two-part fixed-point value, 12 bytes.
    Decimal,
    /// Packed 3-byte date.
    Date,
    /// Packed 8-byte datetime.
    DateTime,
}

/// Decodes one encoded statistics value into its comparison representation.
#[must_use]
pub fn decode_stat(ty: StatType, raw: &[u8]) -> ScalarValue {
    match ty {
        StatType::Boolean => ScalarValue::Boolean(raw[0] != 0),
        StatType::Int8 => ScalarValue::Int64(i64::from(raw[0] as i8)),
        StatType::Int16 => ScalarValue::Int64(i64::from(i16::from_le_bytes(fixed(raw)))),
        StatType::Int32 => ScalarValue::Int64(i64::from(i32::from_le_bytes(fixed(raw)))),
        StatType::Int64 => ScalarValue::Int64(i64::from_le_bytes(fixed(raw))),
        StatType::UInt8 => ScalarValue::UInt64(u64::from(raw[0])),
        StatType::UInt16 => ScalarValue::UInt64(u64::from(u16::from_le_bytes(fixed(raw)))),
        StatType::UInt32 => ScalarValue::UInt64(u64::from(u32::from_le_bytes(fixed(raw)))),
        StatType::UInt64 => ScalarValue::UInt64(u64::from_le_bytes(fixed(raw))),
        StatType::Float32 => ScalarValue::Float64(f64::from(f32::from_le_bytes(fixed(raw)))),
        StatType::Float64 => ScalarValue::Float64(f64::from_le_bytes(fixed(raw))),
        StatType::Decimal => {
            // Integer part and fractional part are stored side by side.
            let integer = i64::from_le_bytes(fixed(&raw[..8]));
            let fraction = i32::from_le_bytes(fixed(&raw[8..12]));
            ScalarValue::Decimal(DecimalValue::from_parts(integer, fraction))
        }
        StatType::Date => {
            let packed = u32::from(raw[0]) | u32::from(raw[1]) << 8 | u32::from(raw[2]) << 16;
            ScalarValue::DateTime(DateTimeValue::from_date24(packed))
        }
        StatType::DateTime => {
            ScalarValue::DateTime(DateTimeValue::from_datetime64(u64::from_le_bytes(fixed(raw))))
        }
    }
}

fn fixed<const N: usize>(raw: &[u8]) -> [u8; N] {
    raw[..N].try_into().expect("length guaranteed by the column format")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reinterpretation() {
        assert_eq!(
            decode_stat(StatType::Int32, &(-7i32).to_le_bytes()),
            ScalarValue::Int64(-7)
        );
        assert_eq!(
            decode_stat(StatType::UInt64, &42u64.to_le_bytes()),
            ScalarValue::UInt64(42)
        );
        assert_eq!(
            decode_stat(StatType::Float64, &1.25f64.to_le_bytes()),
            ScalarValue::Float64(1.25)
        );
    }

    #[test]
    fn decimal12_round_trip() {
        let mut raw = Vec::with_capacity(12);
        raw.extend_from_slice(&123i64.to_le_bytes());
        raw.extend_from_slice(&456_000_000i32.to_le_bytes());
        assert_eq!(
            decode_stat(StatType::Decimal, &raw),
            ScalarValue::Decimal(DecimalValue::from_parts(123, 456_000_000))
        );
    }

    #[test]
    fn date24_round_trip() {
        let value = DateTimeValue::new(2024, 8, 24, 0, 0, 0);
        let packed = value.to_date24();
        let raw = [packed as u8, (packed >> 8) as u8, (packed >> 16) as u8];
        assert_eq!(
            decode_stat(StatType::Date, &raw),
            ScalarValue::DateTime(value)
        );
    }

    #[test]
    fn datetime64_round_trip() {
        let value = DateTimeValue::new(2024, 8, 24, 13, 45, 9);
        let raw = value.to_datetime64().to_le_bytes();
        assert_eq!(
            decode_stat(StatType::DateTime, &raw),
            ScalarValue::DateTime(value)
        );
    }
}

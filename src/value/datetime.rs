//! Calendar date/time value decoded from the packed storage encodings.

use std::fmt;

/// Calendar value with second precision.
///
/// Field order gives the derived `Ord` chronological semantics, which the
/// zone-map comparison paths rely on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeValue {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTimeValue {
    /// Builds a value from explicit calendar components.
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Decodes a packed 3-byte date: `year << 9 | month << 5 | day`.
    #[must_use]
    pub fn from_date24(packed: u32) -> Self {
        Self {
            year: (packed >> 9) as u16,
            month: ((packed >> 5) & 0x0f) as u8,
            day: (packed & 0x1f) as u8,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// Decodes a packed 8-byte datetime: decimal digits `YYYYMMDDHHMMSS`.
    #[must_use]
    pub fn from_datetime64(packed: u64) -> Self {
        let date = packed / 1_000_000;
        let time = packed % 1_000_000;
        Self {
            year: (date / 10_000) as u16,
            month: ((date / 100) % 100) as u8,
            day: (date % 100) as u8,
            hour: (time / 10_000) as u8,
            minute: ((time / 100) % 100) as u8,
            second: (time % 100) as u8,
        }
    }

    /// Re-encodes the date part into the packed 3-byte representation.
    #[must_use]
    pub fn to_date24(self) -> u32 {
        (u32::from(self.year) << 9) | (u32::from(self.month) << 5) | u32::from(self.day)
    }

    /// Re-encodes the value into the packed 8-byte representation.
    #[must_use]
    pub fn to_datetime64(self) -> u64 {
        let date =
            u64::from(self.year) * 10_000 + u64::from(self.month) * 100 + u64::from(self.day);
        let time =
            u64::from(self.hour) * 10_000 + u64::from(self.minute) * 100 + u64::from(self.second);
        date * 1_000_000 + time
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date24_round_trip() {
        let value = DateTimeValue::new(2024, 8, 24, 0, 0, 0);
        assert_eq!(DateTimeValue::from_date24(value.to_date24()), value);
    }

    #[test]
    fn datetime64_round_trip() {
        let value = DateTimeValue::new(2024, 8, 24, 13, 45, 9);
        assert_eq!(value.to_datetime64(), 20_240_824_134_509);
        assert_eq!(DateTimeValue::from_datetime64(value.to_datetime64()), value);
    }

    #[test]
    fn ordering_is_chronological() {
        let earlier = DateTimeValue::new(2023, 12, 31, 23, 59, 59);
        let later = DateTimeValue::new(2024, 1, 1, 0, 0, 0);
        assert!(earlier < later);
    }
}

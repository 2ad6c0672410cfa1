use crate::errdata;
use crate::error::Result;

use serde::{Deserialize, Serialize};

/// Maximum fractional seconds precision.
pub const MAX_FSP: u8 = 6;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// The MySQL type of a time value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeType {
    Date,
    Datetime,
    Timestamp,
}

/// A date, datetime or timestamp. Timestamps are kept as stored (in UTC),
/// without time zone conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
    pub tp: TimeType,
    pub fsp: u8,
}

impl Time {
    /// Unpacks a time from its packed u64 storage form. From the high bits:
    /// year*13+month (17 bits), day (5 bits), hour (5 bits), minute (6 bits),
    /// second (6 bits) and microseconds (24 bits).
    pub fn from_packed(packed: u64, tp: TimeType, fsp: u8) -> Result<Self> {
        let ymdhms = packed >> 24;
        let ymd = ymdhms >> 17;
        let ym = ymd >> 5;
        let hms = ymdhms & ((1 << 17) - 1);
        let time = Self {
            year: u16::try_from(ym / 13).unwrap_or(u16::MAX),
            month: (ym % 13) as u8,
            day: (ymd & 31) as u8,
            hour: (hms >> 12) as u8,
            minute: ((hms >> 6) & 63) as u8,
            second: (hms & 63) as u8,
            microsecond: (packed & ((1 << 24) - 1)) as u32,
            tp,
            fsp: fsp.min(MAX_FSP),
        };
        if time.year > 9999
            || time.hour > 23
            || time.minute > 59
            || time.second > 59
            || time.microsecond > 999_999
        {
            return errdata!("invalid packed time {packed}");
        }
        Ok(time)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.tp == TimeType::Date {
            return Ok(());
        }
        write!(f, " {:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        write_fraction(f, self.microsecond, self.fsp)
    }
}

/// A time duration in nanoseconds, possibly negative, with the given
/// fractional seconds precision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub nanos: i64,
    pub fsp: u8,
}

impl Duration {
    pub fn new(nanos: i64, fsp: u8) -> Self {
        Self { nanos, fsp: fsp.min(MAX_FSP) }
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.nanos < 0 {
            f.write_str("-")?;
        }
        let nanos = self.nanos.unsigned_abs();
        let secs = nanos / NANOS_PER_SEC;
        let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")?;
        write_fraction(f, (nanos % NANOS_PER_SEC / 1000) as u32, self.fsp)
    }
}

/// Writes the microseconds as a fraction with fsp digits, if any.
fn write_fraction(f: &mut std::fmt::Formatter, microsecond: u32, fsp: u8) -> std::fmt::Result {
    if fsp == 0 {
        return Ok(());
    }
    let digits = format!("{microsecond:06}");
    write!(f, ".{}", &digits[..fsp.min(MAX_FSP) as usize])
}

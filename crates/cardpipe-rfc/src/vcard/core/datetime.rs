//! vCard date and time values (RFC 6350 §4.3).
//!
//! vCard allows truncated dates such as `--0203` (no year) that a plain
//! calendar date cannot hold.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

/// A full or truncated date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VCardDate {
    /// YYYYMMDD
    Full(NaiveDate),
    /// YYYY-MM
    YearMonth { year: i32, month: u32 },
    /// YYYY
    Year(i32),
    /// --MMDD
    MonthDay { month: u32, day: u32 },
    /// ---DD
    Day(u32),
}

impl VCardDate {
    /// Returns the year if present.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        match self {
            Self::Full(d) => Some(d.year()),
            Self::YearMonth { year, .. } | Self::Year(year) => Some(*year),
            Self::MonthDay { .. } | Self::Day(_) => None,
        }
    }

    /// Returns the month if present.
    #[must_use]
    pub fn month(&self) -> Option<u32> {
        match self {
            Self::Full(d) => Some(d.month()),
            Self::YearMonth { month, .. } | Self::MonthDay { month, .. } => Some(*month),
            Self::Year(_) | Self::Day(_) => None,
        }
    }

    /// Returns the day if present.
    #[must_use]
    pub fn day(&self) -> Option<u32> {
        match self {
            Self::Full(d) => Some(d.day()),
            Self::MonthDay { day, .. } | Self::Day(day) => Some(*day),
            Self::Year(_) | Self::YearMonth { .. } => None,
        }
    }
}

/// A full or truncated time of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VCardTime {
    /// HHMMSS
    Full(NaiveTime),
    /// HHMM
    HourMinute { hour: u32, minute: u32 },
    /// HH
    Hour(u32),
}

/// UTC offset attached to a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VCardUtcOffset {
    /// Signed hours from UTC.
    pub hours: i8,
    pub minutes: u8,
}

impl VCardUtcOffset {
    pub const UTC: Self = Self {
        hours: 0,
        minutes: 0,
    };

    #[must_use]
    pub const fn new(hours: i8, minutes: u8) -> Self {
        Self { hours, minutes }
    }
}

/// Combined date and/or time (BDAY, ANNIVERSARY).
#[derive(Debug, Clone, PartialEq)]
pub enum DateAndOrTime {
    Date(VCardDate),
    DateTime {
        date: VCardDate,
        time: VCardTime,
        offset: Option<VCardUtcOffset>,
    },
    Time {
        time: VCardTime,
        offset: Option<VCardUtcOffset>,
    },
    /// Free-form text (`VALUE=text`), e.g. "circa 1800".
    Text(String),
}

impl DateAndOrTime {
    /// Creates a full date from year/month/day.
    #[must_use]
    pub fn full_date(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|d| Self::Date(VCardDate::Full(d)))
    }

    /// Returns the date component if available.
    #[must_use]
    pub fn as_date(&self) -> Option<&VCardDate> {
        match self {
            Self::Date(d) | Self::DateTime { date: d, .. } => Some(d),
            Self::Time { .. } | Self::Text(_) => None,
        }
    }
}

/// REV timestamp (RFC 6350 §6.7.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub datetime: DateTime<Utc>,
}

impl Timestamp {
    #[must_use]
    pub fn new(datetime: DateTime<Utc>) -> Self {
        Self { datetime }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_day_has_no_year() {
        let date = VCardDate::MonthDay { month: 2, day: 3 };
        assert_eq!(date.year(), None);
        assert_eq!(date.month(), Some(2));
        assert_eq!(date.day(), Some(3));
    }

    #[test]
    fn full_date_rejects_impossible_days() {
        assert!(DateAndOrTime::full_date(2023, 2, 30).is_none());
        let leap = DateAndOrTime::full_date(2024, 2, 29).unwrap();
        assert_eq!(leap.as_date().and_then(VCardDate::year), Some(2024));
    }
}

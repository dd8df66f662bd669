//! Precision-tagged timestamps.
//!
//! A `Timestamp` covers a range of time whose width is given by its
//! `Precision`: `2024` covers the whole year, `2024-03-05` the whole day.
//! Values are stored truncated to the start of their range, and ordering
//! compares range starts first, then coarser precision before finer. A
//! lower-precision value therefore sorts as if it happened at the start
//! boundary of its range.

use crate::error::{Error, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use std::cmp::Ordering;
use std::fmt;

/// How much of a timestamp is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// Display bucket granularity, coarsest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Granularity {
    Year,
    Month,
    Day,
}

impl Granularity {
    /// Every granularity, coarsest first.
    pub const ALL: [Granularity; 3] = [Granularity::Year, Granularity::Month, Granularity::Day];

    /// The timestamp precision a bucket of this granularity is truncated to.
    #[inline]
    pub fn precision(self) -> Precision {
        match self {
            Granularity::Year => Precision::Year,
            Granularity::Month => Precision::Month,
            Granularity::Day => Precision::Day,
        }
    }

    /// Granularities from `Year` down to and including `finest`.
    pub fn down_to(finest: Granularity) -> impl Iterator<Item = Granularity> {
        Self::ALL.into_iter().filter(move |g| *g <= finest)
    }
}

/// A point in time known to a given precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timestamp {
    start: NaiveDateTime,
    precision: Precision,
}

impl Timestamp {
    /// Creates a timestamp, truncating `value` to `precision`.
    pub fn new(value: NaiveDateTime, precision: Precision) -> Self {
        Self {
            start: truncate(value, precision),
            precision,
        }
    }

    /// A whole year.
    pub fn year(year: i32) -> Result<Self> {
        Self::ymd(year, 1, 1).map(|ts| ts.with_precision(Precision::Year))
    }

    /// A whole month.
    pub fn ym(year: i32, month: u32) -> Result<Self> {
        Self::ymd(year, month, 1).map(|ts| ts.with_precision(Precision::Month))
    }

    /// A whole day.
    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| Error::invalid_timestamp(format!("{year:04}-{month:02}-{day:02}")))?;
        let start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::invalid_timestamp(format!("midnight of {date}")))?;
        Ok(Self {
            start,
            precision: Precision::Day,
        })
    }

    /// A second-precision instant.
    pub fn ymd_hms(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .ok_or_else(|| {
                Error::invalid_timestamp(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                ))
            })?;
        Ok(Self::new(start, Precision::Second))
    }

    /// Returns a copy re-truncated to a coarser (or equal) precision.
    /// Asking for a finer precision keeps the current start.
    pub fn with_precision(self, precision: Precision) -> Self {
        Self::new(self.start, precision)
    }

    /// Start of the covered range.
    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive end of the covered range.
    pub fn end(&self) -> NaiveDateTime {
        let date = self.start.date();
        let next = match self.precision {
            Precision::Year => NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            Precision::Month => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
            Precision::Day => self.start.checked_add_signed(Duration::days(1)),
            Precision::Hour => self.start.checked_add_signed(Duration::hours(1)),
            Precision::Minute => self.start.checked_add_signed(Duration::minutes(1)),
            Precision::Second => self.start.checked_add_signed(Duration::seconds(1)),
        };
        next.unwrap_or(NaiveDateTime::MAX)
    }

    /// The timestamp's precision.
    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// True when `other`'s start lies inside this timestamp's range.
    pub fn covers(&self, other: &Timestamp) -> bool {
        other.start >= self.start && other.start < self.end()
    }

    /// The bucket this timestamp falls in at `granularity`, represented as
    /// the bucket's own (truncated) timestamp.
    #[inline]
    pub fn bucket(&self, granularity: Granularity) -> Timestamp {
        Self::new(self.start, granularity.precision())
    }

    #[inline]
    pub fn year_value(&self) -> i32 {
        self.start.year()
    }

    #[inline]
    pub fn month_value(&self) -> u32 {
        self.start.month()
    }

    #[inline]
    pub fn day_value(&self) -> u32 {
        self.start.day()
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.precision.cmp(&other.precision))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = match self.precision {
            Precision::Year => "%Y",
            Precision::Month => "%Y-%m",
            Precision::Day => "%Y-%m-%d",
            Precision::Hour => "%Y-%m-%d %H:00",
            Precision::Minute => "%Y-%m-%d %H:%M",
            Precision::Second => "%Y-%m-%d %H:%M:%S",
        };
        write!(f, "{}", self.start.format(pattern))
    }
}

/// Drops every component finer than `precision`.
fn truncate(value: NaiveDateTime, precision: Precision) -> NaiveDateTime {
    let date = value.date();
    let date = match precision {
        Precision::Year => date.with_ordinal(1).unwrap_or(date),
        Precision::Month => date.with_day(1).unwrap_or(date),
        _ => date,
    };
    let (hour, minute, second) = match precision {
        Precision::Year | Precision::Month | Precision::Day => (0, 0, 0),
        Precision::Hour => (value.hour(), 0, 0),
        Precision::Minute => (value.hour(), value.minute(), 0),
        Precision::Second => (value.hour(), value.minute(), value.second()),
    };
    date.and_hms_opt(hour, minute, second).unwrap_or(value)
}

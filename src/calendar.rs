//! Calendar arithmetic for the consumption history queries.
//!
//! Weeks here are anchored to the first Monday on or after January 1, which
//! is not the ISO-8601 week numbering: when January 1 falls on Tuesday to
//! Thursday, ISO week 1 starts in December while this scheme starts on the
//! following Monday.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};
use thiserror::Error;

/// The requested week does not start inside the requested year.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("week {week} does not exist in {year}")]
pub struct InvalidWeek {
    pub year: i32,
    pub week: i32,
}

/// Returns the Monday that starts `week` of `year`.
pub fn week_start(year: i32, week: i32) -> Result<NaiveDate, InvalidWeek> {
    let invalid = InvalidWeek { year, week };

    let mut first_monday = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(invalid)?;
    while first_monday.weekday() != Weekday::Mon {
        first_monday = first_monday.succ_opt().ok_or(invalid)?;
    }

    let offset_days = (i64::from(week) - 1) * 7;
    let start = if offset_days >= 0 {
        first_monday.checked_add_days(Days::new(offset_days.unsigned_abs()))
    } else {
        first_monday.checked_sub_days(Days::new(offset_days.unsigned_abs()))
    }
    .ok_or(invalid)?;

    if start.year() != year {
        return Err(invalid);
    }

    Ok(start)
}

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Range {
    fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(NaiveTime::default()).and_utc(),
            end: end.and_time(NaiveTime::default()).and_utc(),
        }
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// The whole calendar day `day`.
pub fn day_range(day: NaiveDate) -> Option<Range> {
    Some(Range::between(day, day.succ_opt()?))
}

/// The whole month starting at `first_day`.
pub fn month_range(first_day: NaiveDate) -> Option<Range> {
    let first_day = first_day.with_day(1)?;
    let next = first_day.checked_add_months(chrono::Months::new(1))?;
    Some(Range::between(first_day, next))
}

/// The seven days starting at `week_start(year, week)`.
pub fn week_range(year: i32, week: i32) -> Result<Range, InvalidWeek> {
    let start = week_start(year, week)?;
    let end = start
        .checked_add_days(Days::new(7))
        .ok_or(InvalidWeek { year, week })?;
    Ok(Range::between(start, end))
}

/// Parses a `yyyy-mm-dd` day.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses a `yyyy-mm` month into its first day.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let (year, month) = value.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

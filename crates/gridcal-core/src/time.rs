//! Time types for calendar events.
//!
//! This module provides [`EventTime`] for representing event start/end times
//! (either an absolute UTC instant or a wall-clock value tied to a named
//! zone), and [`DateWindow`] for the date ranges operators are queried with.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format of a UTC instant in an iCalendar property value.
pub const ICS_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Format of a floating or zoned wall-clock value in an iCalendar property.
pub const ICS_LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Represents the time of a calendar event.
///
/// Operators publish times in two shapes:
/// - **Utc**: a specific instant, rendered with a trailing `Z`
/// - **Zoned**: a local wall-clock value paired with an IANA zone name,
///   rendered with a `TZID` parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific instant, stored in UTC.
    Utc(DateTime<Utc>),
    /// A wall-clock value in a named zone.
    Zoned {
        /// Local date and time, no offset applied.
        local: NaiveDateTime,
        /// IANA zone identifier (e.g. `America/Chicago`).
        tzid: String,
    },
}

impl EventTime {
    /// Creates a new `EventTime::Utc`.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::Utc(dt)
    }

    /// Creates a new `EventTime::Zoned`.
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self::Zoned {
            local,
            tzid: tzid.into(),
        }
    }

    /// Parses a GMT timestamp such as `2025-03-04T15:00:00.000` as a UTC instant.
    ///
    /// Fractional seconds and a trailing `Z` are discarded.
    pub fn parse_gmt(value: &str) -> Option<Self> {
        let naive = parse_iso_naive(value)?;
        Some(Self::Utc(naive.and_utc()))
    }

    /// Parses a local timestamp such as `2026-02-26T08:30:00.0000000` as a
    /// wall-clock value in `tzid`.
    ///
    /// No offset arithmetic is applied; consumers resolve the zone through
    /// the `TZID` parameter.
    pub fn parse_local(value: &str, tzid: &str) -> Option<Self> {
        let naive = parse_iso_naive(value)?;
        Some(Self::zoned(naive, tzid))
    }

    /// Returns `true` if this is a UTC instant.
    pub fn is_utc(&self) -> bool {
        matches!(self, Self::Utc(_))
    }

    /// Returns the zone identifier for zoned times.
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Utc(_) => None,
            Self::Zoned { tzid, .. } => Some(tzid),
        }
    }

    /// Returns the calendar date as published (UTC date or local date).
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Utc(dt) => dt.date_naive(),
            Self::Zoned { local, .. } => local.date(),
        }
    }

    /// Renders this time as a complete iCalendar property line, e.g.
    /// `DTSTART:20250304T150000Z` or `DTEND;TZID=America/Chicago:20260226T093000`.
    pub fn to_property(&self, name: &str) -> String {
        match self {
            Self::Utc(dt) => format!("{}:{}", name, dt.format(ICS_UTC_FORMAT)),
            Self::Zoned { local, tzid } => {
                format!("{};TZID={}:{}", name, tzid, local.format(ICS_LOCAL_FORMAT))
            }
        }
    }
}

/// Parses `YYYY-MM-DDTHH:MM:SS`, tolerating fractional seconds, a trailing
/// `Z`, and a missing seconds field.
fn parse_iso_naive(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim().trim_end_matches('Z');
    let whole = trimmed.split('.').next()?;
    NaiveDateTime::parse_from_str(whole, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(whole, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Formats a UTC instant the way `DTSTAMP` expects it.
pub fn format_stamp(dt: DateTime<Utc>) -> String {
    dt.format(ICS_UTC_FORMAT).to_string()
}

/// A date window for querying and filtering events.
///
/// Represents a half-open interval `[start, end)` of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First date of the window (inclusive).
    pub start: NaiveDate,
    /// Date after the last date of the window (exclusive).
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates a new date window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        assert!(start <= end, "DateWindow start must be <= end");
        Self { start, end }
    }

    /// Creates the window from the first day of `today`'s month to the first
    /// day of the month `months` later.
    pub fn months_ahead(today: NaiveDate, months: u32) -> Self {
        let start = first_of_month(today);
        let end = start
            .checked_add_months(Months::new(months))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// Returns `true` if `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Returns the window bounds as ISO dates (`YYYY-MM-DD`).
    pub fn iso_dates(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }

    /// Returns the window bounds as ISO midnight timestamps.
    pub fn iso_midnights(&self) -> (String, String) {
        let (start, end) = self.iso_dates();
        (format!("{}T00:00:00", start), format!("{}T00:00:00", end))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Returns `(month, year)` pairs for `count` consecutive months starting at
/// `today`'s month.
pub fn month_sequence(today: NaiveDate, count: u32) -> Vec<(u32, i32)> {
    let mut month = today.month();
    let mut year = today.year();
    let mut months = Vec::with_capacity(count as usize);
    for _ in 0..count {
        months.push((month, year));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_gmt_discards_fraction_and_suffix() {
        let t = EventTime::parse_gmt("2025-03-04T15:00:00.000Z").unwrap();
        assert_eq!(
            t,
            EventTime::Utc(Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap())
        );
        assert_eq!(t.to_property("DTSTART"), "DTSTART:20250304T150000Z");
    }

    #[test]
    fn parse_local_keeps_wall_clock() {
        let t = EventTime::parse_local("2026-02-26T08:30:00.0000000", "America/Chicago").unwrap();
        assert_eq!(t.tzid(), Some("America/Chicago"));
        assert_eq!(
            t.to_property("DTEND"),
            "DTEND;TZID=America/Chicago:20260226T083000"
        );
        assert_eq!(t.date(), date(2026, 2, 26));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(EventTime::parse_gmt("").is_none());
        assert!(EventTime::parse_gmt("next tuesday").is_none());
    }

    #[test]
    fn parse_accepts_missing_seconds() {
        let t = EventTime::parse_gmt("2025-03-04T15:30").unwrap();
        assert_eq!(t.to_property("DTSTART"), "DTSTART:20250304T153000Z");
    }

    #[test]
    fn months_ahead_starts_on_first_of_month() {
        let window = DateWindow::months_ahead(date(2025, 11, 17), 3);
        assert_eq!(window.start, date(2025, 11, 1));
        assert_eq!(window.end, date(2026, 2, 1));
        assert_eq!(
            window.iso_dates(),
            ("2025-11-01".to_string(), "2026-02-01".to_string())
        );
        assert_eq!(window.iso_midnights().0, "2025-11-01T00:00:00");
    }

    #[test]
    fn window_is_half_open() {
        let window = DateWindow::new(date(2025, 1, 1), date(2025, 4, 1));
        assert!(window.contains(date(2025, 1, 1)));
        assert!(window.contains(date(2025, 3, 31)));
        assert!(!window.contains(date(2025, 4, 1)));
        assert!(!window.contains(date(2024, 12, 31)));
    }

    #[test]
    fn month_sequence_wraps_year() {
        let months = month_sequence(date(2025, 11, 20), 3);
        assert_eq!(months, vec![(11, 2025), (12, 2025), (1, 2026)]);
    }

    #[test]
    fn stamp_format() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_stamp(dt), "20250102T030405Z");
    }
}

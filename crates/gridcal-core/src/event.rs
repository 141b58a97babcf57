//! Canonical event record.
//!
//! [`EventRecord`] is the source-independent form every JSON-based operator
//! feed is converted into before being rendered as a `VEVENT` block.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::{BlockKind, CRLF, RawBlock};
use crate::text::escape_text;
use crate::time::{EventTime, format_stamp};

/// Prefix added to the summary of a cancelled event.
pub const CANCELLED_SUMMARY_PREFIX: &str = "[CANCELLED] ";

/// First description line of a cancelled event.
pub const CANCELLED_BANNER: &str = "** CANCELLED **";

/// A calendar event in canonical form.
///
/// Text fields hold unescaped values; escaping happens at render time.
/// The generation stamp is not part of the record and is supplied when
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Identity, unique within one output document (`UID`).
    pub identity: String,
    /// Display title.
    pub summary: String,
    /// Start time.
    pub start: EventTime,
    /// End time.
    pub end: Option<EventTime>,
    /// Location.
    pub location: Option<String>,
    /// Description, may contain newlines.
    pub description: Option<String>,
    /// Detail page URL.
    pub url: Option<String>,
    /// Whether the operator flagged the event as cancelled.
    pub cancelled: bool,
}

impl EventRecord {
    /// Creates a new record with the required fields.
    pub fn new(identity: impl Into<String>, summary: impl Into<String>, start: EventTime) -> Self {
        Self {
            identity: identity.into(),
            summary: summary.into(),
            start,
            end: None,
            location: None,
            description: None,
            url: None,
            cancelled: false,
        }
    }

    /// Builder method to set the end time.
    pub fn with_end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder method to set the location. Empty values are ignored.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_empty(location.into());
        self
    }

    /// Builder method to set the description. Empty values are ignored.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    /// Builder method to set the URL. Empty values are ignored.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = non_empty(url.into());
        self
    }

    /// Builder method to mark the event as cancelled.
    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Summary as displayed, with the cancellation prefix when cancelled.
    pub fn display_summary(&self) -> String {
        if self.cancelled {
            format!("{}{}", CANCELLED_SUMMARY_PREFIX, self.summary)
        } else {
            self.summary.clone()
        }
    }

    /// Description as displayed, led by the cancellation banner when cancelled.
    pub fn display_description(&self) -> Option<String> {
        match (self.cancelled, &self.description) {
            (false, description) => description.clone(),
            (true, Some(description)) => Some(format!("{}\n{}", CANCELLED_BANNER, description)),
            (true, None) => Some(CANCELLED_BANNER.to_string()),
        }
    }

    /// Renders the record as a `VEVENT` block stamped with `stamp`.
    ///
    /// Property order is fixed: UID, DTSTAMP, DTSTART, DTEND, SUMMARY,
    /// DESCRIPTION, LOCATION, URL.
    pub fn to_vevent(&self, stamp: DateTime<Utc>) -> String {
        let mut lines = vec![
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.identity),
            format!("DTSTAMP:{}", format_stamp(stamp)),
            self.start.to_property("DTSTART"),
        ];
        if let Some(ref end) = self.end {
            lines.push(end.to_property("DTEND"));
        }
        lines.push(format!("SUMMARY:{}", escape_text(&self.display_summary())));
        if let Some(description) = self.display_description() {
            lines.push(format!("DESCRIPTION:{}", escape_text(&description)));
        }
        if let Some(ref location) = self.location {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(ref url) = self.url {
            lines.push(format!("URL:{}", url));
        }
        lines.push("END:VEVENT".to_string());
        lines.join(CRLF)
    }

    /// Renders the record as a [`RawBlock`] so it can be merged alongside
    /// blocks lifted from operator feeds.
    pub fn to_block(&self, stamp: DateTime<Utc>) -> RawBlock {
        RawBlock::new(BlockKind::Event, self.to_vevent(stamp))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn start() -> EventTime {
        EventTime::from_utc(Utc.with_ymd_and_hms(2025, 2, 4, 15, 0, 0).unwrap())
    }

    #[test]
    fn minimal_record_renders_required_lines() {
        let record = EventRecord::new("1@example.org", "Board Meeting", start());
        insta::assert_debug_snapshot!(
            record.to_vevent(stamp()),
            @r#""BEGIN:VEVENT\r\nUID:1@example.org\r\nDTSTAMP:20250115T120000Z\r\nDTSTART:20250204T150000Z\r\nSUMMARY:Board Meeting\r\nEND:VEVENT""#
        );
    }

    #[test]
    fn full_record_field_order_and_escaping() {
        let local = NaiveDate::from_ymd_opt(2026, 2, 26)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let record = EventRecord::new(
            "42@spp.org",
            "Markets, Operations; Policy",
            EventTime::zoned(local, "America/Chicago"),
        )
        .with_end(EventTime::zoned(local + chrono::Duration::hours(2), "America/Chicago"))
        .with_description("Line one\nLine two")
        .with_location("Little Rock, AR")
        .with_url("https://www.spp.org/events/42");

        let text = record.to_vevent(stamp());
        let lines: Vec<_> = text.split(CRLF).collect();
        assert_eq!(
            lines,
            [
                "BEGIN:VEVENT",
                "UID:42@spp.org",
                "DTSTAMP:20250115T120000Z",
                "DTSTART;TZID=America/Chicago:20260226T083000",
                "DTEND;TZID=America/Chicago:20260226T103000",
                "SUMMARY:Markets\\, Operations\\; Policy",
                "DESCRIPTION:Line one\\nLine two",
                "LOCATION:Little Rock\\, AR",
                "URL:https://www.spp.org/events/42",
                "END:VEVENT",
            ]
        );
    }

    #[test]
    fn cancelled_prefixes_before_escaping() {
        let record = EventRecord::new("c1", "Review; draft", start())
            .with_description("Moved")
            .with_cancelled(true);
        assert_eq!(record.display_summary(), "[CANCELLED] Review; draft");
        assert_eq!(
            record.display_description().as_deref(),
            Some("** CANCELLED **\nMoved")
        );
        let text = record.to_vevent(stamp());
        assert!(text.contains("SUMMARY:[CANCELLED] Review\\; draft\r\n"));
        assert!(text.contains("DESCRIPTION:** CANCELLED **\\nMoved\r\n"));
    }

    #[test]
    fn cancelled_without_description_gets_banner() {
        let record = EventRecord::new("c2", "Review", start()).with_cancelled(true);
        assert_eq!(record.display_description().as_deref(), Some(CANCELLED_BANNER));
    }

    #[test]
    fn empty_optionals_are_dropped() {
        let record = EventRecord::new("e", "t", start())
            .with_location("  ")
            .with_description("")
            .with_url("");
        assert!(record.location.is_none());
        assert!(record.description.is_none());
        assert!(record.url.is_none());
    }

    #[test]
    fn block_carries_identity() {
        let block = EventRecord::new("id-9", "t", start()).to_block(stamp());
        assert_eq!(block.uid(), Some("id-9"));
        assert_eq!(block.start_date(), NaiveDate::from_ymd_opt(2025, 2, 4));
    }
}

//! Structural validation of published calendar documents.
//!
//! Validation never fails: it always yields a [`ValidationReport`] whose
//! [`Verdict`] is derived from the list of [`Issue`]s found.

use std::fmt;

use serde::Serialize;

use crate::block::{BlockKind, all_events};
use crate::document::{CALENDAR_BEGIN, CALENDAR_END, VERSION_LINE};

/// Pass/fail outcome of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// No issues.
    Pass,
    /// At least one issue.
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("PASS"),
            Self::Fail => f.write_str("FAIL"),
        }
    }
}

/// A structural defect found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum Issue {
    /// Trimmed text does not start with `BEGIN:VCALENDAR`.
    MissingCalendarBegin,
    /// Trimmed text does not end with `END:VCALENDAR`.
    MissingCalendarEnd,
    /// No `VERSION:2.0` declaration.
    MissingVersion,
    /// No `PRODID:` declaration.
    MissingProductId,
    /// `BEGIN:VEVENT` and `END:VEVENT` counts differ.
    EventMarkerMismatch {
        /// Begin markers.
        begin: usize,
        /// End markers.
        end: usize,
    },
    /// Event blocks without a `DTSTART`.
    EventsMissingStart {
        /// Number of blocks.
        count: usize,
    },
    /// Event blocks without a `SUMMARY`.
    EventsMissingSummary {
        /// Number of blocks.
        count: usize,
    },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCalendarBegin => f.write_str("missing BEGIN:VCALENDAR"),
            Self::MissingCalendarEnd => f.write_str("missing END:VCALENDAR"),
            Self::MissingVersion => f.write_str("missing VERSION:2.0"),
            Self::MissingProductId => f.write_str("missing PRODID"),
            Self::EventMarkerMismatch { begin, end } => {
                write!(f, "VEVENT mismatch: {} begin vs {} end", begin, end)
            }
            Self::EventsMissingStart { count } => write!(f, "{} events missing DTSTART", count),
            Self::EventsMissingSummary { count } => {
                write!(f, "{} events missing SUMMARY", count)
            }
        }
    }
}

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Number of `BEGIN:VEVENT` markers.
    pub event_count: usize,
    /// Document size in characters; the KB column is characters / 1024.
    pub size_chars: usize,
    /// Issues found, in check order.
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// The verdict: pass iff there are no issues.
    pub fn verdict(&self) -> Verdict {
        if self.issues.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// Returns `true` if the document passed.
    pub fn passed(&self) -> bool {
        self.verdict() == Verdict::Pass
    }

    /// Issues as human-readable strings.
    pub fn issue_messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// Formats one summary row, e.g.
    /// `PJM      |   412 events |   188.3 KB | PASS `.
    pub fn summary_row(&self, name: &str) -> String {
        format!(
            "{:8} | {:5} events | {:7.1} KB | {} {}",
            name,
            self.event_count,
            self.size_chars as f64 / 1024.0,
            self.verdict(),
            self.issue_messages().join(" | ")
        )
    }
}

/// Validates a complete calendar document.
pub fn validate_document(text: &str) -> ValidationReport {
    let kind = BlockKind::Event;
    let begin = count_marker_lines(text, kind.begin_marker());
    let end = count_marker_lines(text, kind.end_marker());
    let trimmed = text.trim();

    let mut issues = Vec::new();
    if !trimmed.starts_with(CALENDAR_BEGIN) {
        issues.push(Issue::MissingCalendarBegin);
    }
    if !trimmed.ends_with(CALENDAR_END) {
        issues.push(Issue::MissingCalendarEnd);
    }
    if !text.contains(VERSION_LINE) {
        issues.push(Issue::MissingVersion);
    }
    if !text.contains("PRODID:") {
        issues.push(Issue::MissingProductId);
    }
    if begin != end {
        issues.push(Issue::EventMarkerMismatch { begin, end });
    }

    let blocks = all_events(text);
    let missing_start = blocks
        .iter()
        .filter(|b| !b.as_str().contains("DTSTART"))
        .count();
    let missing_summary = blocks
        .iter()
        .filter(|b| !b.as_str().contains("SUMMARY"))
        .count();
    if missing_start > 0 {
        issues.push(Issue::EventsMissingStart {
            count: missing_start,
        });
    }
    if missing_summary > 0 {
        issues.push(Issue::EventsMissingSummary {
            count: missing_summary,
        });
    }

    ValidationReport {
        event_count: begin,
        size_chars: text.chars().count(),
        issues,
    }
}

fn count_marker_lines(text: &str, marker: &str) -> usize {
    text.lines().filter(|line| line.trim() == marker).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AMERICA_CHICAGO_VTIMEZONE;

    fn event(uid: &str, summary: bool) -> String {
        let mut lines = vec![
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", uid),
            "DTSTART;TZID=America/Chicago:20250301T090000".to_string(),
        ];
        if summary {
            lines.push(format!("SUMMARY:Meeting {}", uid));
        }
        lines.push("END:VEVENT".to_string());
        lines.join("\r\n")
    }

    fn document(events: &[String]) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//SPP Calendar Sync//EN\r\nCALSCALE:GREGORIAN\r\nMETHOD:PUBLISH\r\nX-WR-CALNAME:SPP Events\r\nX-WR-TIMEZONE:America/Chicago\r\n{}\r\n{}\r\nEND:VCALENDAR\r\n",
            AMERICA_CHICAGO_VTIMEZONE,
            events.join("\r\n")
        )
    }

    #[test]
    fn well_formed_document_passes() {
        let report = validate_document(&document(&[event("1", true), event("2", true)]));
        assert_eq!(report.verdict(), Verdict::Pass);
        assert!(report.issues.is_empty());
        assert_eq!(report.event_count, 2);
    }

    #[test]
    fn missing_summary_fails() {
        let report = validate_document(&document(&[event("1", true), event("2", false)]));
        assert_eq!(report.verdict(), Verdict::Fail);
        assert_eq!(report.issue_messages(), ["1 events missing SUMMARY"]);
    }

    #[test]
    fn marker_mismatch() {
        let text = document(&[event("1", true)]).replace(
            "END:VCALENDAR",
            "BEGIN:VEVENT\r\nUID:dangling\r\nEND:VCALENDAR",
        );
        let report = validate_document(&text);
        assert!(!report.passed());
        assert!(
            report
                .issue_messages()
                .contains(&"VEVENT mismatch: 2 begin vs 1 end".to_string())
        );
    }

    #[test]
    fn empty_text_reports_every_header_issue() {
        let report = validate_document("");
        assert_eq!(
            report.issue_messages(),
            [
                "missing BEGIN:VCALENDAR",
                "missing END:VCALENDAR",
                "missing VERSION:2.0",
                "missing PRODID",
            ]
        );
        assert_eq!(report.event_count, 0);
    }

    #[test]
    fn missing_dtstart_counted() {
        let bare = "BEGIN:VEVENT\r\nUID:x\r\nSUMMARY:x\r\nEND:VEVENT".to_string();
        let report = validate_document(&document(&[bare.clone(), bare]));
        assert_eq!(report.issue_messages(), ["2 events missing DTSTART"]);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let text = format!("\n\n{}\n\n", document(&[event("1", true)]));
        assert!(validate_document(&text).passed());
    }

    #[test]
    fn size_counts_characters() {
        let ascii = validate_document(&document(&[event("1", true)]));
        let accented = validate_document(
            &document(&[event("1", true)]).replace("SUMMARY:", "SUMMARY:\u{e9}"),
        );
        assert_eq!(accented.size_chars, ascii.size_chars + 1);
    }

    #[test]
    fn summary_row_format() {
        let report = ValidationReport {
            event_count: 12,
            size_chars: 2048,
            issues: vec![Issue::MissingProductId, Issue::EventsMissingSummary { count: 3 }],
        };
        assert_eq!(
            report.summary_row("ISO-NE"),
            "ISO-NE   |    12 events |     2.0 KB | FAIL missing PRODID | 3 events missing SUMMARY"
        );
    }

    #[test]
    fn report_serializes() {
        let report = validate_document(&document(&[event("1", false)]));
        insta::assert_json_snapshot!(report, @r#"
        {
          "event_count": 1,
          "size_chars": 592,
          "issues": [
            {
              "issue": "events_missing_summary",
              "count": 1
            }
          ]
        }
        "#);
    }
}

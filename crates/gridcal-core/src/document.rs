//! Merged calendar document assembly.
//!
//! A [`Document`] is a fixed header, an optional `VTIMEZONE` block and the
//! ordered event blocks, rendered with CRLF line separators:
//!
//! ```text
//! BEGIN:VCALENDAR
//! VERSION:2.0
//! PRODID:-//PJM Calendar Sync//EN
//! CALSCALE:GREGORIAN
//! METHOD:PUBLISH
//! X-WR-CALNAME:PJM Events
//! X-WR-TIMEZONE:America/New_York
//! [BEGIN:VTIMEZONE .. END:VTIMEZONE]
//! BEGIN:VEVENT .. END:VEVENT
//! ...
//! END:VCALENDAR
//! ```

use crate::block::{BlockKind, CRLF, RawBlock};

/// Calendar begin marker.
pub const CALENDAR_BEGIN: &str = "BEGIN:VCALENDAR";

/// Calendar end marker.
pub const CALENDAR_END: &str = "END:VCALENDAR";

/// Version declaration line.
pub const VERSION_LINE: &str = "VERSION:2.0";

/// Fixed `VTIMEZONE` definition for US Central time.
pub const AMERICA_CHICAGO_VTIMEZONE: &str = "BEGIN:VTIMEZONE\r\n\
TZID:America/Chicago\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19701101T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r\n\
TZOFFSETFROM:-0500\r\n\
TZOFFSETTO:-0600\r\n\
TZNAME:CST\r\n\
END:STANDARD\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:19700308T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n\
TZOFFSETFROM:-0600\r\n\
TZOFFSETTO:-0500\r\n\
TZNAME:CDT\r\n\
END:DAYLIGHT\r\n\
END:VTIMEZONE";

/// Fixed `VTIMEZONE` definition for US Eastern time.
pub const AMERICA_NEW_YORK_VTIMEZONE: &str = "BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19701101T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r\n\
TZOFFSETFROM:-0400\r\n\
TZOFFSETTO:-0500\r\n\
TZNAME:EST\r\n\
END:STANDARD\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:19700308T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n\
TZOFFSETFROM:-0500\r\n\
TZOFFSETTO:-0400\r\n\
TZNAME:EDT\r\n\
END:DAYLIGHT\r\n\
END:VTIMEZONE";

/// Returns the fixed `VTIMEZONE` block for one of the supported zones.
pub fn fixed_timezone(tzid: &str) -> Option<RawBlock> {
    let text = match tzid {
        "America/Chicago" => AMERICA_CHICAGO_VTIMEZONE,
        "America/New_York" => AMERICA_NEW_YORK_VTIMEZONE,
        _ => return None,
    };
    Some(RawBlock::new(BlockKind::Timezone, text))
}

/// The metadata lines at the top of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarHeader {
    /// Producer identifier (`PRODID`).
    pub product_id: String,
    /// Display name (`X-WR-CALNAME`).
    pub display_name: String,
    /// Display timezone (`X-WR-TIMEZONE`).
    pub display_timezone: String,
}

impl CalendarHeader {
    /// Creates a header.
    pub fn new(
        product_id: impl Into<String>,
        display_name: impl Into<String>,
        display_timezone: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            display_name: display_name.into(),
            display_timezone: display_timezone.into(),
        }
    }

    /// Header lines in output order.
    pub fn lines(&self) -> [String; 7] {
        [
            CALENDAR_BEGIN.to_string(),
            VERSION_LINE.to_string(),
            format!("PRODID:{}", self.product_id),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            format!("X-WR-CALNAME:{}", self.display_name),
            format!("X-WR-TIMEZONE:{}", self.display_timezone),
        ]
    }
}

/// Collects the parts of a document.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    header: CalendarHeader,
    timezone: Option<RawBlock>,
    events: Vec<RawBlock>,
}

impl DocumentBuilder {
    /// Starts a document with `header`.
    pub fn new(header: CalendarHeader) -> Self {
        Self {
            header,
            timezone: None,
            events: Vec::new(),
        }
    }

    /// Builder method to set the timezone definition block.
    pub fn with_timezone(mut self, timezone: Option<RawBlock>) -> Self {
        self.timezone = timezone;
        self
    }

    /// Appends one event block.
    pub fn push_event(&mut self, block: RawBlock) {
        self.events.push(block);
    }

    /// Appends event blocks in order.
    pub fn extend_events(&mut self, blocks: impl IntoIterator<Item = RawBlock>) {
        self.events.extend(blocks);
    }

    /// Number of event blocks collected so far.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Finishes the document. Returns `None` when no event was collected.
    pub fn build(self) -> Option<Document> {
        if self.events.is_empty() {
            return None;
        }
        Some(Document {
            header: self.header,
            timezone: self.timezone,
            events: self.events,
        })
    }
}

/// A complete calendar document, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    header: CalendarHeader,
    timezone: Option<RawBlock>,
    events: Vec<RawBlock>,
}

impl Document {
    /// The header.
    pub fn header(&self) -> &CalendarHeader {
        &self.header
    }

    /// The timezone definition block, if any.
    pub fn timezone(&self) -> Option<&RawBlock> {
        self.timezone.as_ref()
    }

    /// The event blocks in output order.
    pub fn events(&self) -> &[RawBlock] {
        &self.events
    }

    /// Renders the document text.
    pub fn render(&self) -> String {
        let mut out = self.header.lines().join(CRLF);
        out.push_str(CRLF);
        if let Some(ref tz) = self.timezone {
            out.push_str(tz.as_str());
            out.push_str(CRLF);
        }
        let body: Vec<&str> = self.events.iter().map(RawBlock::as_str).collect();
        out.push_str(&body.join(CRLF));
        out.push_str(CRLF);
        out.push_str(CALENDAR_END);
        out.push_str(CRLF);
        out
    }
}

//! Line-oriented block scanning for iCalendar text.
//!
//! Operators that publish ready-made calendar files are merged by lifting
//! their `VEVENT` (and `VTIMEZONE`) blocks out verbatim. A single scan
//! routine handles all three shapes the pipelines need:
//!
//! - the first `VEVENT` of a per-event export,
//! - every `VEVENT` of a batch export or category feed,
//! - the first `VTIMEZONE` of a feed.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Line separator used by every emitted block and document.
pub const CRLF: &str = "\r\n";

/// Matches a `DTSTART` line (any parameters) and captures its `YYYYMMDD` date.
static DTSTART_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^DTSTART[^:]*:(\d{8})").expect("Invalid DTSTART regex"));

/// The kind of component a block delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `BEGIN:VEVENT` .. `END:VEVENT`
    Event,
    /// `BEGIN:VTIMEZONE` .. `END:VTIMEZONE`
    Timezone,
}

impl BlockKind {
    /// The begin marker line.
    pub fn begin_marker(self) -> &'static str {
        match self {
            Self::Event => "BEGIN:VEVENT",
            Self::Timezone => "BEGIN:VTIMEZONE",
        }
    }

    /// The end marker line.
    pub fn end_marker(self) -> &'static str {
        match self {
            Self::Event => "END:VEVENT",
            Self::Timezone => "END:VTIMEZONE",
        }
    }
}

/// Parameters for one scan: which markers to look for and whether to stop
/// after the first complete block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockScan {
    /// Kind of block to extract.
    pub kind: BlockKind,
    /// Stop at the first complete block.
    pub first_only: bool,
}

impl BlockScan {
    /// Scan for the first block of `kind`.
    pub fn first(kind: BlockKind) -> Self {
        Self {
            kind,
            first_only: true,
        }
    }

    /// Scan for every block of `kind`.
    pub fn all(kind: BlockKind) -> Self {
        Self {
            kind,
            first_only: false,
        }
    }

    /// Runs the scan over `text`.
    ///
    /// Line endings are normalized before scanning. Marker lines are matched
    /// after trimming and are kept in the emitted block, which is re-joined
    /// with CRLF. A block whose end marker never arrives is discarded.
    pub fn run(&self, text: &str) -> Vec<RawBlock> {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let begin = self.kind.begin_marker();
        let end = self.kind.end_marker();

        let mut blocks = Vec::new();
        let mut buf: Vec<&str> = Vec::new();
        let mut inside = false;

        for line in normalized.split('\n') {
            let trimmed = line.trim();
            if trimmed == begin && !(inside && self.first_only) {
                inside = true;
                buf.clear();
            }
            if inside {
                buf.push(line);
            }
            if inside && trimmed == end {
                blocks.push(RawBlock::new(self.kind, buf.join(CRLF)));
                inside = false;
                buf.clear();
                if self.first_only {
                    break;
                }
            }
        }

        blocks
    }
}

/// Returns the first `VEVENT` block in `text`.
pub fn first_event(text: &str) -> Option<RawBlock> {
    BlockScan::first(BlockKind::Event).run(text).into_iter().next()
}

/// Returns every `VEVENT` block in `text`, in source order.
pub fn all_events(text: &str) -> Vec<RawBlock> {
    BlockScan::all(BlockKind::Event).run(text)
}

/// Returns the first `VTIMEZONE` block in `text`.
pub fn first_timezone(text: &str) -> Option<RawBlock> {
    BlockScan::first(BlockKind::Timezone)
        .run(text)
        .into_iter()
        .next()
}

/// A verbatim span of calendar text bounded by a begin/end marker pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    kind: BlockKind,
    text: String,
}

impl RawBlock {
    /// Wraps already-delimited block text.
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// The block kind.
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// The block text, CRLF-separated, markers included.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the block, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Returns the value of the first line starting with `prefix`, trimmed.
    ///
    /// An empty value counts as absent.
    pub fn field(&self, prefix: &str) -> Option<&str> {
        self.text
            .split(CRLF)
            .find_map(|line| line.strip_prefix(prefix))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Returns the `UID` of the block, if any.
    pub fn uid(&self) -> Option<&str> {
        self.field("UID:")
    }

    /// Returns the date portion of the first `DTSTART` line.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.text.split(CRLF).find_map(|line| {
            let caps = DTSTART_DATE_REGEX.captures(line)?;
            NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()
        })
    }
}

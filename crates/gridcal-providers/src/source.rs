//! The operators whose calendars are aggregated.

use std::fmt;
use std::str::FromStr;

use gridcal_core::dedup::{Deduplicator, MissingIdentity};
use gridcal_core::{CalendarHeader, DateWindow, RawBlock, fixed_timezone};
use serde::{Deserialize, Serialize};

/// A grid operator with a public event calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// California ISO.
    Caiso,
    /// Electric Reliability Council of Texas.
    Ercot,
    /// ISO New England.
    Isone,
    /// Midcontinent ISO.
    Miso,
    /// New York ISO.
    Nyiso,
    /// PJM Interconnection.
    Pjm,
    /// Southwest Power Pool.
    Spp,
}

impl Source {
    /// Every source, in the order runs process them.
    pub const ALL: [Source; 7] = [
        Self::Caiso,
        Self::Ercot,
        Self::Isone,
        Self::Miso,
        Self::Nyiso,
        Self::Pjm,
        Self::Spp,
    ];

    /// Lowercase identifier used for file names and the CLI.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Caiso => "caiso",
            Self::Ercot => "ercot",
            Self::Isone => "isone",
            Self::Miso => "miso",
            Self::Nyiso => "nyiso",
            Self::Pjm => "pjm",
            Self::Spp => "spp",
        }
    }

    /// Display name of the operator.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Caiso => "CAISO",
            Self::Ercot => "ERCOT",
            Self::Isone => "ISO-NE",
            Self::Miso => "MISO",
            Self::Nyiso => "NYISO",
            Self::Pjm => "PJM",
            Self::Spp => "SPP",
        }
    }

    /// Timezone advertised in `X-WR-TIMEZONE`.
    pub fn display_timezone(&self) -> &'static str {
        match self {
            Self::Caiso => "America/Los_Angeles",
            Self::Ercot | Self::Spp => "America/Chicago",
            Self::Isone | Self::Miso | Self::Nyiso | Self::Pjm => "America/New_York",
        }
    }

    /// Output file name.
    pub fn file_name(&self) -> String {
        format!("{}.ics", self.slug())
    }

    /// Header of the merged document.
    pub fn header(&self) -> CalendarHeader {
        CalendarHeader::new(
            format!("-//{} Calendar Sync//EN", self.name()),
            format!("{} Events", self.name()),
            self.display_timezone(),
        )
    }

    /// Timezone definition embedded regardless of feed content.
    ///
    /// ERCOT and SPP publish Central wall-clock times and always carry the
    /// fixed Central definition. NYISO takes the first definition found in
    /// its own feeds instead.
    pub fn fixed_timezone(&self) -> Option<RawBlock> {
        match self {
            Self::Ercot | Self::Spp => fixed_timezone("America/Chicago"),
            _ => None,
        }
    }

    /// The identity filter this source's events pass through.
    pub fn deduplicator(&self, window: DateWindow) -> Deduplicator {
        match self {
            Self::Nyiso => Deduplicator::new().with_missing_identity(MissingIdentity::Drop),
            Self::Pjm => Deduplicator::new()
                .with_missing_identity(MissingIdentity::Drop)
                .with_window(window),
            _ => Deduplicator::new(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "");
        Self::ALL
            .into_iter()
            .find(|source| source.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(Source::slug).collect();
                format!("unknown source '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

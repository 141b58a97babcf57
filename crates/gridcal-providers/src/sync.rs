//! One source, end to end: retrieve, filter identities, build the document.

use std::time::Duration;

use chrono::{DateTime, Utc};
use gridcal_core::{DateWindow, Document, DocumentBuilder, RawBlock};
use serde::Serialize;
use tracing::info;

use crate::adapter::scrape::DEFAULT_BATCH_SIZE;
use crate::collect::collect;
use crate::error::ProviderResult;
use crate::fetch::Fetcher;
use crate::source::Source;

/// Run settings shared by every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Months covered by the date window, starting at the current month.
    pub months: u32,
    /// Per-event downloads between two pauses (0 disables pausing).
    pub pause_every: usize,
    /// Length of each pause.
    pub pause: Duration,
    /// Ids per ERCOT batch download.
    pub ercot_batch_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            months: 3,
            pause_every: 10,
            pause: Duration::from_millis(500),
            ercot_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SyncOptions {
    /// Builder method to set the number of months.
    pub fn with_months(mut self, months: u32) -> Self {
        self.months = months;
        self
    }

    /// Builder method to set the politeness pause.
    pub fn with_pause(mut self, every: usize, pause: Duration) -> Self {
        self.pause_every = every;
        self.pause = pause;
        self
    }

    /// Builder method to set the ERCOT batch size.
    pub fn with_ercot_batch_size(mut self, size: usize) -> Self {
        self.ercot_batch_size = size;
        self
    }
}

/// Counters describing one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Items named by the listing(s).
    pub listed: usize,
    /// Event blocks retrieved.
    pub retrieved: usize,
    /// Failed downloads or unconvertible entries.
    pub skipped: usize,
    /// Blocks dropped for repeating an identity.
    pub duplicates: usize,
    /// Blocks dropped by the date window.
    pub out_of_window: usize,
    /// Blocks dropped for lacking an identity.
    pub missing_identity: usize,
    /// Blocks written to the document.
    pub kept: usize,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// At least one event survived; the document is ready to write.
    Built {
        /// The merged document.
        document: Document,
        /// Run counters.
        stats: SyncStats,
    },
    /// Nothing survived retrieval and filtering. No document is produced.
    Empty {
        /// Run counters.
        stats: SyncStats,
    },
}

impl SyncOutcome {
    /// Run counters.
    pub fn stats(&self) -> &SyncStats {
        match self {
            Self::Built { stats, .. } | Self::Empty { stats } => stats,
        }
    }

    /// The document, if one was built.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Built { document, .. } => Some(document),
            Self::Empty { .. } => None,
        }
    }
}

/// Runs `source` against `fetcher`, with the date window anchored at `now`.
///
/// Blocks from every listing, batch or feed pass through one deduplicator
/// in retrieval order, so the first occurrence of an identity wins across
/// the whole run.
pub async fn run(
    source: Source,
    fetcher: &dyn Fetcher,
    options: &SyncOptions,
    now: DateTime<Utc>,
) -> ProviderResult<SyncOutcome> {
    let window = DateWindow::months_ahead(now.date_naive(), options.months);
    info!(source = %source, from = %window.start, to = %window.end, "sync started");

    let harvest = collect(source, fetcher, options, window, now)
        .await
        .map_err(|err| err.with_operator(source.name()))?;

    let mut dedup = source.deduplicator(window);
    let (blocks, batch) = dedup.filter(harvest.blocks, |block: &RawBlock| {
        (block.uid().map(str::to_string), block.start_date())
    });
    let stats = SyncStats {
        listed: harvest.listed,
        retrieved: batch.total,
        skipped: harvest.skipped,
        duplicates: batch.duplicates,
        out_of_window: batch.out_of_window,
        missing_identity: batch.missing_identity,
        kept: batch.kept,
    };

    let timezone = source.fixed_timezone().or(harvest.timezone);
    let mut builder = DocumentBuilder::new(source.header()).with_timezone(timezone);
    builder.extend_events(blocks);

    let outcome = match builder.build() {
        Some(document) => SyncOutcome::Built { document, stats },
        None => SyncOutcome::Empty { stats },
    };
    info!(
        source = %source,
        kept = stats.kept,
        duplicates = stats.duplicates,
        out_of_window = stats.out_of_window,
        skipped = stats.skipped,
        "sync finished"
    );
    Ok(outcome)
}

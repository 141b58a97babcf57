//! Identity-based deduplication across feeds.
//!
//! A [`Deduplicator`] is created once per run and fed every batch in the
//! order the batches were retrieved. The first entry carrying a given
//! identity wins; later entries with that identity are dropped, whether
//! they come from the same batch or a later one.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::trace;

use crate::time::DateWindow;

/// What to do with entries that carry no identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingIdentity {
    /// Keep them; they never collide with anything.
    #[default]
    Keep,
    /// Drop them.
    Drop,
}

/// Why an entry was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Start date outside the configured window.
    OutOfWindow,
    /// Identity already admitted earlier in the run.
    Duplicate,
    /// No identity, and the policy requires one.
    MissingIdentity,
}

/// Counters for one batch passed through [`Deduplicator::filter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Entries offered.
    pub total: usize,
    /// Entries admitted.
    pub kept: usize,
    /// Entries dropped as duplicates.
    pub duplicates: usize,
    /// Entries dropped for falling outside the window.
    pub out_of_window: usize,
    /// Entries dropped for lacking an identity.
    pub missing_identity: usize,
}

impl BatchStats {
    fn record(&mut self, rejection: Option<Rejection>) {
        self.total += 1;
        match rejection {
            None => self.kept += 1,
            Some(Rejection::Duplicate) => self.duplicates += 1,
            Some(Rejection::OutOfWindow) => self.out_of_window += 1,
            Some(Rejection::MissingIdentity) => self.missing_identity += 1,
        }
    }
}

/// Per-run identity filter with an optional date window.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
    missing: MissingIdentity,
    window: Option<DateWindow>,
}

impl Deduplicator {
    /// Creates a deduplicator that keeps identity-less entries and applies no window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the missing-identity policy.
    pub fn with_missing_identity(mut self, policy: MissingIdentity) -> Self {
        self.missing = policy;
        self
    }

    /// Builder method to drop entries whose start date falls outside `window`.
    ///
    /// Entries without a known start date are not window-filtered.
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Number of distinct identities admitted so far.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Decides whether a single entry is admitted, recording its identity if so.
    ///
    /// An out-of-window entry does not mark its identity as seen.
    pub fn check(
        &mut self,
        identity: Option<&str>,
        start: Option<NaiveDate>,
    ) -> Result<(), Rejection> {
        let Some(identity) = identity else {
            return match self.missing {
                MissingIdentity::Keep => {
                    if self.outside_window(start) {
                        Err(Rejection::OutOfWindow)
                    } else {
                        Ok(())
                    }
                }
                MissingIdentity::Drop => Err(Rejection::MissingIdentity),
            };
        };
        if self.seen.contains(identity) {
            return Err(Rejection::Duplicate);
        }
        if self.outside_window(start) {
            return Err(Rejection::OutOfWindow);
        }
        self.seen.insert(identity.to_string());
        Ok(())
    }

    fn outside_window(&self, start: Option<NaiveDate>) -> bool {
        match (self.window, start) {
            (Some(window), Some(date)) => !window.contains(date),
            _ => false,
        }
    }

    /// Filters one batch, preserving order.
    ///
    /// `key` extracts the identity and start date of each entry.
    pub fn filter<T, F>(&mut self, items: Vec<T>, key: F) -> (Vec<T>, BatchStats)
    where
        F: Fn(&T) -> (Option<String>, Option<NaiveDate>),
    {
        let mut stats = BatchStats::default();
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            let (identity, start) = key(&item);
            let verdict = self.check(identity.as_deref(), start);
            if let Err(reason) = verdict {
                trace!(identity = ?identity, reason = ?reason, "entry dropped");
            }
            stats.record(verdict.err());
            if verdict.is_ok() {
                kept.push(item);
            }
        }
        (kept, stats)
    }
}

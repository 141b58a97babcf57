//! Scraped-id adapter: event ids lifted from a calendar page.

use std::sync::LazyLock;

use gridcal_core::DateWindow;
use regex::Regex;

use crate::error::ProviderResult;
use crate::fetch::FetchRequest;

const ERCOT_CALENDAR_URL: &str = "https://www.ercot.com/calendar";
const ERCOT_BATCH_URL: &str = "https://www.ercot.com/ical/meetings";

/// Default number of ids per batch download.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Matches a UUID in a form `value` attribute.
static EVENT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"value="([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})""#,
    )
    .expect("Invalid event id regex")
});

/// Operators whose calendar page is scraped for event ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapedIdAdapter {
    /// Checkbox values on the ERCOT calendar page.
    Ercot,
}

impl ScrapedIdAdapter {
    /// The calendar page request covering `window`.
    pub fn page_request(&self, window: DateWindow) -> ProviderResult<FetchRequest> {
        let (from, to) = window.iso_dates();
        Ok(FetchRequest::get(ERCOT_CALENDAR_URL)?
            .with_query(&[("fromDate", from.as_str()), ("toDate", to.as_str())]))
    }

    /// Ids found in `html`, first occurrence order, without repeats.
    pub fn scrape_ids(&self, html: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for caps in EVENT_ID_REGEX.captures_iter(html) {
            let id = &caps[1];
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }

    /// Batch download requests, at most `batch_size` ids each.
    ///
    /// Ids are joined with literal commas; the endpoint does not accept
    /// encoded separators.
    pub fn batch_requests(
        &self,
        ids: &[String],
        batch_size: usize,
    ) -> ProviderResult<Vec<FetchRequest>> {
        ids.chunks(batch_size.max(1))
            .map(|batch| FetchRequest::get(&format!("{}?ids={}", ERCOT_BATCH_URL, batch.join(","))))
            .collect()
    }
}

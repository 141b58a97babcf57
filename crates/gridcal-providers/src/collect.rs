//! Per-family retrieval pipelines.
//!
//! Each pipeline turns one source's endpoints into a [`Harvest`]: raw event
//! blocks in retrieval order, plus an optional timezone definition taken
//! from the feeds. Identity filtering happens afterwards, in
//! [`crate::sync`].
//!
//! Failure policy: a listing that cannot be retrieved or parsed fails the
//! source; a single event download, ERCOT batch, MISO month or category feed
//! that fails is logged and skipped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use gridcal_core::{DateWindow, RawBlock, all_events, first_event, first_timezone};
use tracing::{debug, info, warn};

use crate::adapter::{
    CategoryFeeds, EventRef, JsonEventAdapter, ListingAdapter, SchemaAdapter, ScrapedIdAdapter,
};
use crate::error::ProviderResult;
use crate::fetch::{FetchRequest, Fetcher};
use crate::source::Source;
use crate::sync::SyncOptions;

/// What one source's retrieval produced, before identity filtering.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Event blocks in retrieval order.
    pub blocks: Vec<RawBlock>,
    /// Timezone definition found in the feeds, when the source keeps one.
    pub timezone: Option<RawBlock>,
    /// Items named by the listing (entries, ids or feed events).
    pub listed: usize,
    /// Downloads or conversions that failed and were skipped.
    pub skipped: usize,
}

/// Sleeps for `pause` after every `every` requests.
#[derive(Debug)]
pub(crate) struct Pacer {
    every: usize,
    pause: Duration,
    count: usize,
}

impl Pacer {
    pub(crate) fn new(every: usize, pause: Duration) -> Self {
        Self {
            every,
            pause,
            count: 0,
        }
    }

    /// Records one request, pausing when the quota is reached.
    pub(crate) async fn tick(&mut self) {
        self.count += 1;
        if self.every > 0 && self.count % self.every == 0 && !self.pause.is_zero() {
            debug!(requests = self.count, pause_ms = self.pause.as_millis() as u64, "pausing");
            tokio::time::sleep(self.pause).await;
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }
}

/// Runs the retrieval pipeline of `source`.
pub async fn collect(
    source: Source,
    fetcher: &dyn Fetcher,
    options: &SyncOptions,
    window: DateWindow,
    stamp: DateTime<Utc>,
) -> ProviderResult<Harvest> {
    match SchemaAdapter::for_source(source) {
        SchemaAdapter::Listing(adapter) => collect_listing(adapter, fetcher, options, window).await,
        SchemaAdapter::ScrapedIds(adapter) => {
            collect_scraped(adapter, fetcher, options, window).await
        }
        SchemaAdapter::JsonEvent(adapter) => collect_json(adapter, fetcher, window, stamp).await,
        SchemaAdapter::CategoryFeeds(adapter) => collect_feeds(adapter, fetcher).await,
    }
}

/// Downloads a calendar document, rejecting bodies that are not one.
async fn fetch_calendar(fetcher: &dyn Fetcher, request: &FetchRequest) -> Option<String> {
    match fetcher.fetch(request).await {
        Ok(body) if body.contains("BEGIN:VCALENDAR") => Some(body),
        Ok(_) => {
            warn!(url = %request.url(), "response is not a calendar");
            None
        }
        Err(err) => {
            warn!(url = %request.url(), error = %err, retryable = err.is_retryable(), "download failed");
            None
        }
    }
}

async fn collect_listing(
    adapter: ListingAdapter,
    fetcher: &dyn Fetcher,
    options: &SyncOptions,
    window: DateWindow,
) -> ProviderResult<Harvest> {
    let mut entries = Vec::new();
    for request in adapter.listing_requests(window, options.months)? {
        let listed = match fetcher.fetch(&request).await {
            Ok(body) => adapter.entries(&body),
            Err(err) => Err(err),
        };
        match listed {
            Ok(found) => entries.extend(found),
            Err(err) if adapter.tolerates_listing_failure() => {
                warn!(url = %request.url(), error = %err, "listing failed, skipping");
            }
            Err(err) => return Err(err),
        }
    }

    let refs = adapter.refs(entries);
    info!(adapter = ?adapter, events = refs.len(), "listing retrieved");

    let mut harvest = Harvest {
        listed: refs.len(),
        ..Harvest::default()
    };
    let mut pacer = Pacer::new(options.pause_every, options.pause);
    let total = refs.len();
    for (index, event) in refs.iter().enumerate() {
        debug!(key = %event.key, title = %event.title, "[{}/{}]", index + 1, total);
        match download_event(fetcher, event).await {
            Some(block) => harvest.blocks.push(block),
            None => harvest.skipped += 1,
        }
        pacer.tick().await;
    }
    debug!(requests = pacer.count(), skipped = harvest.skipped, "downloads finished");
    Ok(harvest)
}

async fn download_event(fetcher: &dyn Fetcher, event: &EventRef) -> Option<RawBlock> {
    let request = match FetchRequest::get(&event.url) {
        Ok(request) => request,
        Err(err) => {
            warn!(key = %event.key, error = %err, "unusable event URL");
            return None;
        }
    };
    let body = fetch_calendar(fetcher, &request).await?;
    let block = first_event(&body);
    if block.is_none() {
        warn!(key = %event.key, "download holds no event");
    }
    block
}

async fn collect_scraped(
    adapter: ScrapedIdAdapter,
    fetcher: &dyn Fetcher,
    options: &SyncOptions,
    window: DateWindow,
) -> ProviderResult<Harvest> {
    let page = fetcher.fetch(&adapter.page_request(window)?).await?;
    let ids = adapter.scrape_ids(&page);
    info!(adapter = ?adapter, events = ids.len(), "event ids scraped");

    let mut harvest = Harvest {
        listed: ids.len(),
        ..Harvest::default()
    };
    let batches = adapter.batch_requests(&ids, options.ercot_batch_size)?;
    let total = batches.len();
    for (index, request) in batches.iter().enumerate() {
        debug!(batch = index + 1, total, "downloading batch");
        match fetch_calendar(fetcher, request).await {
            Some(body) => harvest.blocks.extend(all_events(&body)),
            None => harvest.skipped += 1,
        }
    }
    Ok(harvest)
}

async fn collect_json(
    adapter: JsonEventAdapter,
    fetcher: &dyn Fetcher,
    window: DateWindow,
    stamp: DateTime<Utc>,
) -> ProviderResult<Harvest> {
    let body = fetcher.fetch(&adapter.request(window)?).await?;
    let entries = adapter.entries(&body)?;
    info!(adapter = ?adapter, events = entries.len(), "events retrieved");

    let mut harvest = Harvest {
        listed: entries.len(),
        ..Harvest::default()
    };
    for entry in &entries {
        match adapter.to_record(entry) {
            Some(record) => harvest.blocks.push(record.to_block(stamp)),
            None => harvest.skipped += 1,
        }
    }
    Ok(harvest)
}

async fn collect_feeds(adapter: CategoryFeeds, fetcher: &dyn Fetcher) -> ProviderResult<Harvest> {
    let mut harvest = Harvest::default();
    for (feed, request) in adapter.requests()? {
        let Some(body) = fetch_calendar(fetcher, &request).await else {
            warn!(feed = feed.name, "feed unavailable, skipping");
            harvest.skipped += 1;
            continue;
        };
        if adapter.keeps_feed_timezone() && harvest.timezone.is_none() {
            harvest.timezone = first_timezone(&body);
        }
        let blocks = all_events(&body);
        debug!(feed = feed.name, events = blocks.len(), "feed retrieved");
        harvest.listed += blocks.len();
        harvest.blocks.extend(blocks);
    }
    Ok(harvest)
}

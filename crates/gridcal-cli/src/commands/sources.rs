//! Operator listing.

use gridcal_providers::{SchemaAdapter, Source};

/// One line per operator: slug, name, display timezone, retrieval shape.
pub fn rows() -> Vec<String> {
    Source::ALL
        .iter()
        .map(|source| {
            let shape = match SchemaAdapter::for_source(*source) {
                SchemaAdapter::Listing(_) => "JSON listing, per-event ICS",
                SchemaAdapter::ScrapedIds(_) => "scraped ids, batch ICS",
                SchemaAdapter::JsonEvent(_) => "JSON events",
                SchemaAdapter::CategoryFeeds(_) => "category ICS feeds",
            };
            format!(
                "{:6} {:7} {:20} {}",
                source.slug(),
                source.name(),
                source.display_timezone(),
                shape
            )
        })
        .collect()
}

/// Prints the operator table.
pub fn list() {
    for row in rows() {
        println!("{}", row);
    }
}

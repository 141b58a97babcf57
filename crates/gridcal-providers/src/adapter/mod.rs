//! Schema adapters: the per-family conversion of operator payloads.
//!
//! Each operator publishes events in one of four shapes. The shape decides
//! which adapter its payloads go through:
//!
//! | Adapter                        | Input                      | Output            |
//! |--------------------------------|----------------------------|-------------------|
//! | [`ListingAdapter`]             | JSON listing entries       | [`EventRef`]s     |
//! | [`ScrapedIdAdapter`]           | calendar page HTML         | event ids         |
//! | [`JsonEventAdapter`]           | JSON event objects         | `EventRecord`s    |
//! | [`CategoryFeeds`]              | static per-category ICS    | raw event blocks  |

pub mod feeds;
pub mod json;
pub mod listing;
pub mod scrape;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ProviderError, ProviderResult};
use crate::source::Source;

pub use feeds::{CategoryFeeds, Feed};
pub use json::JsonEventAdapter;
pub use listing::ListingAdapter;
pub use scrape::ScrapedIdAdapter;

/// The adapter selected for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaAdapter {
    /// JSON listing naming one ICS download per event.
    Listing(ListingAdapter),
    /// Event ids scraped from HTML, downloaded as batched ICS.
    ScrapedIds(ScrapedIdAdapter),
    /// JSON events converted directly into records.
    JsonEvent(JsonEventAdapter),
    /// Static ICS files, one per category.
    CategoryFeeds(CategoryFeeds),
}

impl SchemaAdapter {
    /// Returns the adapter for `source`.
    pub fn for_source(source: Source) -> Self {
        match source {
            Source::Caiso => Self::Listing(ListingAdapter::Caiso),
            Source::Miso => Self::Listing(ListingAdapter::Miso),
            Source::Ercot => Self::ScrapedIds(ScrapedIdAdapter::Ercot),
            Source::Isone => Self::JsonEvent(JsonEventAdapter::IsoNe),
            Source::Spp => Self::JsonEvent(JsonEventAdapter::Spp),
            Source::Nyiso => Self::CategoryFeeds(CategoryFeeds::Nyiso),
            Source::Pjm => Self::CategoryFeeds(CategoryFeeds::Pjm),
        }
    }
}

/// A pointer to a single event's ICS download, taken from a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRef {
    /// Identifier the listing uses for the event.
    pub key: String,
    /// Human-readable title, for progress logging.
    pub title: String,
    /// The ICS endpoint.
    pub url: String,
}

/// Reads a JSON scalar as a non-empty string.
///
/// Operator ids arrive as either numbers or strings.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Serde helper accepting a string, a number or null.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_string))
}

/// Parses a JSON body and returns its event array.
///
/// With `key` the array is read from that member of a top-level object,
/// otherwise the body itself must be an array. A missing member yields an
/// empty list.
pub(crate) fn event_array(body: &str, key: Option<&str>) -> ProviderResult<Vec<Value>> {
    let parsed: Value = serde_json::from_str(body)?;
    let array = match key {
        Some(key) => match parsed {
            Value::Object(mut map) => map.remove(key).unwrap_or(Value::Array(Vec::new())),
            other => {
                return Err(ProviderError::invalid_response(format!(
                    "expected a JSON object with '{}', got {}",
                    key,
                    json_kind(&other)
                )));
            }
        },
        None => parsed,
    };
    match array {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(ProviderError::invalid_response(format!(
            "expected a JSON array of events, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

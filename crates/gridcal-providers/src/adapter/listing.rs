//! Listing adapter: JSON listings that name one ICS download per event.

use gridcal_core::dedup::{Deduplicator, MissingIdentity};
use gridcal_core::{DateWindow, month_sequence};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{EventRef, event_array, lenient_string};
use crate::error::ProviderResult;
use crate::fetch::FetchRequest;

const CAISO_LISTING_URL: &str = "https://www.caiso.com/resources/calendar.json";
const CAISO_EXPORT_URL: &str = "https://www.caiso.com/resources/export/ical";
const MISO_LISTING_URL: &str = "https://www.misoenergy.org/api/events/geteventsformonth";
const MISO_EVENTS_URL: &str = "https://www.misoenergy.org/events";

/// Operators whose listing points at per-event ICS exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAdapter {
    /// One listing request for the whole window; entries carry `id`, `title`.
    Caiso,
    /// One listing request per month; entries carry `contentGuid`, `name`,
    /// `urlSegment`, `startDate`.
    Miso,
}

#[derive(Debug, Deserialize)]
struct CaisoEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MisoEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    content_guid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    url_segment: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    start_date: Option<String>,
}

impl ListingAdapter {
    /// Listing requests covering `months` months from the window start.
    pub fn listing_requests(
        &self,
        window: DateWindow,
        months: u32,
    ) -> ProviderResult<Vec<FetchRequest>> {
        match self {
            Self::Caiso => {
                let (start, end) = window.iso_dates();
                let request = FetchRequest::get(CAISO_LISTING_URL)?
                    .with_query(&[("start", start.as_str()), ("end", end.as_str())]);
                Ok(vec![request])
            }
            Self::Miso => month_sequence(window.start, months)
                .into_iter()
                .map(|(month, year)| {
                    Ok(FetchRequest::get(MISO_LISTING_URL)?.with_query(&[
                        ("month", month.to_string().as_str()),
                        ("year", year.to_string().as_str()),
                    ]))
                })
                .collect(),
        }
    }

    /// Whether a failed listing request only loses that listing.
    ///
    /// MISO lists month by month, so one bad month leaves the rest usable.
    pub fn tolerates_listing_failure(&self) -> bool {
        matches!(self, Self::Miso)
    }

    /// Extracts the entries of one listing response.
    pub fn entries(&self, body: &str) -> ProviderResult<Vec<Value>> {
        match self {
            Self::Caiso => event_array(body, None),
            Self::Miso => event_array(body, Some("events")),
        }
    }

    /// Converts the entries of every listing response into download refs,
    /// in download order. Entries without the fields needed to address an
    /// ICS export are skipped.
    pub fn refs(&self, entries: Vec<Value>) -> Vec<EventRef> {
        match self {
            Self::Caiso => entries.iter().filter_map(caiso_ref).collect(),
            Self::Miso => miso_refs(entries),
        }
    }
}

fn caiso_ref(value: &Value) -> Option<EventRef> {
    let entry = CaisoEntry::deserialize(value).ok()?;
    let Some(id) = entry.id else {
        debug!("skipping CAISO entry without id");
        return None;
    };
    Some(EventRef {
        url: format!("{}?id={}", CAISO_EXPORT_URL, id),
        title: entry.title.unwrap_or_else(|| "Unknown".to_string()),
        key: id,
    })
}

/// Entries repeat across months; the first listing of each `contentGuid`
/// wins, then downloads run in `startDate` order.
fn miso_refs(entries: Vec<Value>) -> Vec<EventRef> {
    let parsed: Vec<MisoEntry> = entries
        .iter()
        .filter_map(|value| MisoEntry::deserialize(value).ok())
        .collect();
    let mut dedup = Deduplicator::new().with_missing_identity(MissingIdentity::Drop);
    let (mut unique, stats) = dedup.filter(parsed, |entry| (entry.content_guid.clone(), None));
    debug!(
        listed = stats.total,
        unique = stats.kept,
        duplicates = stats.duplicates,
        "MISO listing deduplicated"
    );
    unique.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    unique
        .into_iter()
        .filter_map(|entry| {
            let segment = entry.url_segment?;
            let start_date = entry.start_date?;
            let year: i32 = start_date.get(..4)?.parse().ok()?;
            Some(EventRef {
                key: entry.content_guid?,
                title: entry.name.unwrap_or_else(|| "Unknown".to_string()),
                url: format!("{}/{}/{}/AddToICalendar", MISO_EVENTS_URL, year, segment),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn window() -> DateWindow {
        DateWindow::months_ahead(NaiveDate::from_ymd_opt(2025, 11, 17).unwrap(), 3)
    }

    #[test]
    fn caiso_single_listing_request() {
        let requests = ListingAdapter::Caiso.listing_requests(window(), 3).unwrap();
        let urls: Vec<_> = requests.iter().map(|r| r.url().as_str()).collect();
        assert_eq!(
            urls,
            ["https://www.caiso.com/resources/calendar.json?start=2025-11-01&end=2026-02-01"]
        );
    }

    #[test]
    fn miso_month_requests_wrap_year() {
        let requests = ListingAdapter::Miso.listing_requests(window(), 3).unwrap();
        let queries: Vec<_> = requests.iter().map(|r| r.url().query().unwrap()).collect();
        assert_eq!(
            queries,
            ["month=11&year=2025", "month=12&year=2025", "month=1&year=2026"]
        );
    }

    #[test]
    fn caiso_refs() {
        let entries = json!([
            {"id": 1234, "title": "Board of Governors"},
            {"title": "no id"},
            {"id": "98", "title": null},
        ]);
        let refs = ListingAdapter::Caiso.refs(entries.as_array().unwrap().clone());
        insta::assert_debug_snapshot!(refs, @r#"
        [
            EventRef {
                key: "1234",
                title: "Board of Governors",
                url: "https://www.caiso.com/resources/export/ical?id=1234",
            },
            EventRef {
                key: "98",
                title: "Unknown",
                url: "https://www.caiso.com/resources/export/ical?id=98",
            },
        ]
        "#);
    }

    #[test]
    fn miso_refs_dedup_sort_and_skip() {
        let entries = json!([
            {"contentGuid": "g2", "name": "Later", "urlSegment": "later", "startDate": "2025-12-03T10:00:00"},
            {"contentGuid": "g1", "name": "Earlier", "urlSegment": "earlier", "startDate": "2025-11-20T09:00:00"},
            {"contentGuid": "g2", "name": "Later again", "urlSegment": "later", "startDate": "2025-12-03T10:00:00"},
            {"name": "No guid", "urlSegment": "x", "startDate": "2025-11-01"},
            {"contentGuid": "g3", "name": "No segment", "startDate": "2025-11-02"},
            {"contentGuid": "g4", "name": "Next year", "urlSegment": "jan", "startDate": "2026-01-05"},
        ]);
        let refs = ListingAdapter::Miso.refs(entries.as_array().unwrap().clone());
        let keys: Vec<_> = refs.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["g1", "g2", "g4"]);
        assert_eq!(refs[1].title, "Later");
        assert_eq!(
            refs[2].url,
            "https://www.misoenergy.org/events/2026/jan/AddToICalendar"
        );
    }

    #[test]
    fn entries_shapes() {
        assert_eq!(ListingAdapter::Caiso.entries("[{}, {}]").unwrap().len(), 2);
        assert_eq!(
            ListingAdapter::Miso
                .entries(r#"{"events": [{}], "total": 1}"#)
                .unwrap()
                .len(),
            1
        );
        assert!(ListingAdapter::Miso.tolerates_listing_failure());
        assert!(!ListingAdapter::Caiso.tolerates_listing_failure());
    }
}

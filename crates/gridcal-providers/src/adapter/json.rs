//! JSON-event adapter: operators whose API returns complete event objects.

use gridcal_core::{DateWindow, EventRecord, EventTime, html_to_text};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{event_array, lenient_string};
use crate::error::ProviderResult;
use crate::fetch::FetchRequest;

const ISONE_EVENTS_URL: &str = "https://www.iso-ne.com/api/1/services/events.json";
const ISONE_BASE: &str = "https://www.iso-ne.com";
const SPP_EVENTS_URL: &str = "https://www.spp.org/umbraco/Api/calendarApi/events";
const SPP_BASE: &str = "https://www.spp.org";
const SPP_REFERER: &str = "https://www.spp.org/events/";

/// Wall-clock zone of SPP timestamps.
pub const SPP_TIMEZONE: &str = "America/Chicago";

/// Operators whose events are built from JSON fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonEventAdapter {
    /// GMT timestamps, HTML descriptions, contact details, cancellation flag.
    IsoNe,
    /// Central wall-clock timestamps, split location fields.
    Spp,
}

#[derive(Debug, Deserialize)]
struct IsoNeEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    event_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    event_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    event_start_date_gmt_str: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    event_end_date_gmt_str: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    contact_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    contact_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    cancelled_flag: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    event_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SppEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    alternate_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    start: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    end: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
}

impl JsonEventAdapter {
    /// The single listing request covering `window`.
    pub fn request(&self, window: DateWindow) -> ProviderResult<FetchRequest> {
        match self {
            Self::IsoNe => {
                let (from, to) = window.iso_midnights();
                Ok(FetchRequest::get(ISONE_EVENTS_URL)?.with_query(&[
                    ("sortBy", "event_start_date_gmt asc"),
                    ("fromDate", from.as_str()),
                    ("toDate", to.as_str()),
                    ("count", "1000"),
                ]))
            }
            Self::Spp => {
                let (start, end) = window.iso_dates();
                Ok(FetchRequest::get(SPP_EVENTS_URL)?
                    .with_query(&[("start", start.as_str()), ("end", end.as_str())])
                    .with_header("Referer", SPP_REFERER))
            }
        }
    }

    /// Extracts the event objects from the listing response.
    pub fn entries(&self, body: &str) -> ProviderResult<Vec<Value>> {
        match self {
            Self::IsoNe => event_array(body, Some("events")),
            Self::Spp => event_array(body, None),
        }
    }

    /// Converts one event object.
    ///
    /// Returns `None` when the identity or start time is missing or
    /// unparseable.
    pub fn to_record(&self, value: &Value) -> Option<EventRecord> {
        let record = match self {
            Self::IsoNe => IsoNeEvent::deserialize(value).ok().and_then(isone_record),
            Self::Spp => SppEvent::deserialize(value).ok().and_then(spp_record),
        };
        if record.is_none() {
            debug!(adapter = ?self, "skipping event without identity or start");
        }
        record
    }
}

fn isone_record(event: IsoNeEvent) -> Option<EventRecord> {
    let id = event.event_id?;
    let start = EventTime::parse_gmt(event.event_start_date_gmt_str.as_deref()?)?;
    let detail_url = format!("{}/event-details?eventId={}", ISONE_BASE, id);

    let mut description = Vec::new();
    if let Some(html) = event.event_description {
        let text = html_to_text(&html);
        if !text.is_empty() {
            description.push(text);
        }
    }
    if let Some(name) = event.contact_name {
        match event.contact_email {
            Some(email) => description.push(format!("Contact: {} ({})", name, email)),
            None => description.push(format!("Contact: {}", name)),
        }
    }
    description.push(detail_url.clone());

    let mut record = EventRecord::new(
        format!("{}@iso-ne.com", id),
        event
            .event_title
            .unwrap_or_else(|| "ISO-NE Event".to_string()),
        start,
    )
    .with_location(event.location.unwrap_or_default())
    .with_description(description.join("\n"))
    .with_url(detail_url)
    .with_cancelled(event.cancelled_flag.as_deref() == Some("Y"));
    if let Some(end) = event
        .event_end_date_gmt_str
        .as_deref()
        .and_then(EventTime::parse_gmt)
    {
        record = record.with_end(end);
    }
    Some(record)
}

fn spp_record(event: SppEvent) -> Option<EventRecord> {
    let id = event.id?;
    let start = EventTime::parse_local(event.start.as_deref()?, SPP_TIMEZONE)?;
    let title = event.title.unwrap_or_else(|| "SPP Event".to_string());

    let location = [event.location, event.city, event.state]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    let url = match event.url {
        Some(url) if !url.starts_with("http") => format!("{}{}", SPP_BASE, url),
        Some(url) => url,
        None => String::new(),
    };
    let description = event
        .alternate_title
        .filter(|alternate| *alternate != title)
        .unwrap_or_default();

    let mut record = EventRecord::new(format!("{}@spp.org", id), title, start)
        .with_location(location)
        .with_description(description)
        .with_url(url);
    if let Some(end) = event
        .end
        .as_deref()
        .and_then(|end| EventTime::parse_local(end, SPP_TIMEZONE))
    {
        record = record.with_end(end);
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    fn stamp() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::months_ahead(NaiveDate::from_ymd_opt(2025, 11, 17).unwrap(), 3)
    }

    #[test]
    fn isone_request() {
        let request = JsonEventAdapter::IsoNe.request(window()).unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://www.iso-ne.com/api/1/services/events.json?sortBy=event_start_date_gmt+asc&fromDate=2025-11-01T00%3A00%3A00&toDate=2026-02-01T00%3A00%3A00&count=1000"
        );
        assert!(request.headers().is_empty());
    }

    #[test]
    fn spp_request_sends_referer() {
        let request = JsonEventAdapter::Spp.request(window()).unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://www.spp.org/umbraco/Api/calendarApi/events?start=2025-11-01&end=2026-02-01"
        );
        assert_eq!(
            request.headers(),
            [("Referer".to_string(), "https://www.spp.org/events/".to_string())]
        );
    }

    #[test]
    fn isone_cancelled_event() {
        let value = json!({
            "event_id": 5521,
            "event_title": "Markets Committee; Day 1",
            "event_start_date_gmt_str": "2025-11-18T14:00:00.000",
            "event_end_date_gmt_str": "2025-11-18T21:00:00.000",
            "location": "Westborough, MA",
            "contact_name": "Pat Doe",
            "contact_email": "pdoe@iso-ne.com",
            "cancelled_flag": "Y",
            "event_description": "<p>Agenda posted</p><br/>Bring a badge &amp; ID",
        });
        let record = JsonEventAdapter::IsoNe.to_record(&value).unwrap();
        insta::assert_snapshot!(record.to_vevent(stamp()).replace("\r\n", "\n"), @r"
        BEGIN:VEVENT
        UID:5521@iso-ne.com
        DTSTAMP:20251101T120000Z
        DTSTART:20251118T140000Z
        DTEND:20251118T210000Z
        SUMMARY:[CANCELLED] Markets Committee\; Day 1
        DESCRIPTION:** CANCELLED **\nAgenda posted\nBring a badge & ID\nContact: Pat Doe (pdoe@iso-ne.com)\nhttps://www.iso-ne.com/event-details?eventId=5521
        LOCATION:Westborough\, MA
        URL:https://www.iso-ne.com/event-details?eventId=5521
        END:VEVENT
        ");
    }

    #[test]
    fn isone_minimal_event() {
        let value = json!({
            "event_id": "77",
            "event_start_date_gmt_str": "2025-12-01T15:30:00",
            "cancelled_flag": "N",
            "contact_name": "Desk",
            "event_description": null,
        });
        let record = JsonEventAdapter::IsoNe.to_record(&value).unwrap();
        assert_eq!(record.summary, "ISO-NE Event");
        assert!(!record.cancelled);
        assert!(record.end.is_none());
        assert!(record.location.is_none());
        assert_eq!(
            record.description.as_deref(),
            Some("Contact: Desk\nhttps://www.iso-ne.com/event-details?eventId=77")
        );
    }

    #[test]
    fn isone_missing_mandatory_fields() {
        let adapter = JsonEventAdapter::IsoNe;
        assert!(adapter.to_record(&json!({"event_start_date_gmt_str": "2025-12-01T15:30:00"})).is_none());
        assert!(adapter.to_record(&json!({"event_id": 1})).is_none());
        assert!(adapter.to_record(&json!({"event_id": 1, "event_start_date_gmt_str": "soon"})).is_none());
        assert!(adapter.to_record(&json!("not an object")).is_none());
    }

    #[test]
    fn spp_event_keeps_central_wall_clock() {
        let value = json!({
            "id": 9001,
            "title": "Markets and Operations Policy Committee",
            "alternateTitle": "MOPC",
            "start": "2026-02-26T08:30:00.0000000",
            "end": "2026-02-26T17:00:00.0000000",
            "location": "Hilton",
            "city": "Dallas",
            "state": "TX",
            "url": "/events/mopc-feb",
        });
        let record = JsonEventAdapter::Spp.to_record(&value).unwrap();
        insta::assert_snapshot!(record.to_vevent(stamp()).replace("\r\n", "\n"), @r"
        BEGIN:VEVENT
        UID:9001@spp.org
        DTSTAMP:20251101T120000Z
        DTSTART;TZID=America/Chicago:20260226T083000
        DTEND;TZID=America/Chicago:20260226T170000
        SUMMARY:Markets and Operations Policy Committee
        DESCRIPTION:MOPC
        LOCATION:Hilton\, Dallas\, TX
        URL:https://www.spp.org/events/mopc-feb
        END:VEVENT
        ");
    }

    #[test]
    fn spp_optional_fields() {
        let value = json!({
            "id": "abc",
            "title": "Board",
            "alternateTitle": "Board",
            "start": "2026-01-10T09:00:00",
            "city": "Little Rock",
            "state": "",
            "url": "https://example.org/board",
        });
        let record = JsonEventAdapter::Spp.to_record(&value).unwrap();
        assert!(record.description.is_none());
        assert_eq!(record.location.as_deref(), Some("Little Rock"));
        assert_eq!(record.url.as_deref(), Some("https://example.org/board"));
        assert!(record.end.is_none());

        let untitled = JsonEventAdapter::Spp
            .to_record(&json!({"id": 1, "start": "2026-01-10T09:00:00"}))
            .unwrap();
        assert_eq!(untitled.summary, "SPP Event");
        assert!(untitled.url.is_none());
        assert!(untitled.location.is_none());

        assert!(JsonEventAdapter::Spp.to_record(&json!({"id": 1})).is_none());
        assert!(JsonEventAdapter::Spp.to_record(&json!({"start": "2026-01-10T09:00:00"})).is_none());
    }

    #[test]
    fn entries_shapes() {
        assert_eq!(
            JsonEventAdapter::IsoNe
                .entries(r#"{"events": [{}, {}], "count": 2}"#)
                .unwrap()
                .len(),
            2
        );
        assert_eq!(JsonEventAdapter::Spp.entries("[]").unwrap().len(), 0);
        assert!(JsonEventAdapter::Spp.entries(r#"{"events": []}"#).is_err());
    }
}

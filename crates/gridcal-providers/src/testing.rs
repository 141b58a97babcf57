//! In-memory fetcher and ICS fixtures for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{ProviderError, ProviderResult};
use crate::fetch::{BoxFuture, FetchRequest, Fetcher};

/// Serves canned bodies keyed by exact URL; anything else is a 404.
#[derive(Debug, Default)]
pub(crate) struct FakeFetcher {
    responses: HashMap<String, String>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl FakeFetcher {
    pub(crate) fn with(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses.insert(url.to_string(), body.into());
        self
    }

    pub(crate) fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url().as_str().to_string())
            .collect()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, ProviderResult<String>> {
        self.requests.lock().unwrap().push(request.clone());
        let result = self
            .responses
            .get(request.url().as_str())
            .cloned()
            .ok_or_else(|| ProviderError::not_found(format!("{} not found", request.url())));
        Box::pin(async move { result })
    }
}

pub(crate) fn vevent(uid: &str, date: &str, summary: &str) -> String {
    format!(
        "BEGIN:VEVENT\r\nUID:{}\r\nDTSTART:{}T150000Z\r\nSUMMARY:{}\r\nEND:VEVENT",
        uid, date, summary
    )
}

pub(crate) fn vtimezone(tzid: &str) -> String {
    format!("BEGIN:VTIMEZONE\r\nTZID:{}\r\nEND:VTIMEZONE", tzid)
}

pub(crate) fn calendar(parts: &[String]) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Operator//EN\r\n{}\r\nEND:VCALENDAR\r\n",
        parts.join("\r\n")
    )
}

//! HTTP retrieval seam.
//!
//! Every source pipeline talks to the network through the [`Fetcher`] trait
//! so that pipelines can be exercised against canned responses. The
//! production implementation is [`HttpFetcher`], backed by `reqwest`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{trace, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (gridcal calendar sync)";

/// A boxed future for async trait methods.
///
/// Using boxed futures keeps [`Fetcher`] object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A GET request against an operator endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: Url,
    headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Creates a request for `url`.
    pub fn get(url: &str) -> ProviderResult<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            headers: Vec::new(),
        })
    }

    /// Builder method to append query parameters (form-encoded).
    pub fn with_query(mut self, pairs: &[(&str, &str)]) -> Self {
        {
            let mut query = self.url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }
        self
    }

    /// Builder method to add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Extra request headers, in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Retrieves response bodies as text.
///
/// Implementations must map non-success statuses to a [`ProviderError`].
pub trait Fetcher: Send + Sync {
    /// Performs the request and returns the body.
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, ProviderResult<String>>;
}

/// Settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    /// Builder method to set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the given settings.
    pub fn new(config: &HttpConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("Failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;
        Ok(Self { client })
    }

    async fn send(&self, request: &FetchRequest) -> ProviderResult<String> {
        trace!(url = %request.url(), "GET");
        let mut builder = self.client.get(request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder.send().await.map_err(|e| {
            ProviderError::network(format!("Request to {} failed: {}", request.url(), e))
                .with_source(e)
        })?;
        handle_response(response).await
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(self.send(request))
    }
}

async fn handle_response(response: Response) -> ProviderResult<String> {
    let status = response.status();
    let url = response.url().clone();
    trace!(status = %status, url = %url, "Received response");

    match status {
        s if s.is_success() => response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("Failed to read response: {}", e))),
        StatusCode::NOT_FOUND => Err(ProviderError::not_found(format!("{} not found", url))),
        StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::rate_limited(format!(
            "Too many requests to {}",
            url.host_str().unwrap_or_default()
        ))),
        s if s.is_server_error() => Err(ProviderError::server(format!(
            "Server error ({}) from {}",
            s, url
        ))),
        s if s.is_client_error() => Err(ProviderError::bad_request(format!(
            "Request rejected ({}) by {}",
            s, url
        ))),
        s => {
            warn!(status = %s, url = %url, "Unexpected response status");
            Err(ProviderError::invalid_response(format!(
                "Unexpected status {} from {}",
                s, url
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_are_form_encoded() {
        let request = FetchRequest::get("https://www.iso-ne.com/api/1/services/events.json")
            .unwrap()
            .with_query(&[("sortBy", "event_start_date_gmt asc"), ("count", "1000")]);
        assert_eq!(
            request.url().as_str(),
            "https://www.iso-ne.com/api/1/services/events.json?sortBy=event_start_date_gmt+asc&count=1000"
        );
    }

    #[test]
    fn literal_commas_survive_parsing() {
        let request = FetchRequest::get("https://www.ercot.com/ical/meetings?ids=a,b,c").unwrap();
        assert_eq!(request.url().query(), Some("ids=a,b,c"));
    }

    #[test]
    fn headers_are_kept_in_order() {
        let request = FetchRequest::get("https://www.spp.org/")
            .unwrap()
            .with_header("Referer", "https://www.spp.org/events/")
            .with_header("Accept", "application/json");
        assert_eq!(
            request.headers(),
            [
                ("Referer".to_string(), "https://www.spp.org/events/".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_url_is_configuration_error() {
        let err = FetchRequest::get("not a url").unwrap_err();
        assert_eq!(err.code(), crate::error::ProviderErrorCode::ConfigurationError);
    }

    #[test]
    fn http_fetcher_builds_with_defaults() {
        let config = HttpConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent");
        assert_eq!(config.user_agent, "test-agent");
        assert!(HttpFetcher::new(&config).is_ok());
    }
}

//! Retrieval errors.
//!
//! Only whole-source failures surface as errors (a listing endpoint that
//! cannot be reached or parsed). Failures of individual event downloads or
//! category feeds are logged and skipped by the pipelines.

use std::fmt;
use thiserror::Error;

/// What went wrong while talking to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Connection, DNS, TLS or timeout failure.
    NetworkError,
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    ServerError,
    /// Body is not the JSON, HTML or calendar text expected.
    InvalidResponse,
    /// HTTP 404.
    NotFound,
    /// Any other HTTP 4xx.
    BadRequest,
    /// Unusable URL or HTTP client settings.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Transient failures, where a later run may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Snake-case name used in messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retrieval failure, optionally tagged with the operator it concerns.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    operator: Option<&'static str>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates an error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            operator: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::BadRequest, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Tags the error with an operator name (e.g. "PJM").
    pub fn with_operator(mut self, operator: &'static str) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Attaches the underlying error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn operator(&self) -> Option<&'static str> {
        self.operator
    }

    /// See [`ProviderErrorCode::is_retryable`].
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operator) = self.operator {
            write!(f, "[{}] ", operator)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<url::ParseError> for ProviderError {
    fn from(err: url::ParseError) -> Self {
        Self::configuration(format!("invalid URL: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_response(format!("malformed JSON: {}", err)).with_source(err)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_codes() {
        let retryable: Vec<_> = [
            ProviderErrorCode::NetworkError,
            ProviderErrorCode::RateLimited,
            ProviderErrorCode::ServerError,
            ProviderErrorCode::InvalidResponse,
            ProviderErrorCode::NotFound,
            ProviderErrorCode::BadRequest,
            ProviderErrorCode::ConfigurationError,
        ]
        .iter()
        .map(ProviderErrorCode::is_retryable)
        .collect();
        assert_eq!(retryable, [true, true, true, false, false, false, false]);
    }

    #[test]
    fn display_carries_operator_and_code() {
        let err = ProviderError::rate_limited("too many requests to www.misoenergy.org")
            .with_operator("MISO");
        assert_eq!(
            err.to_string(),
            "[MISO] rate_limited: too many requests to www.misoenergy.org"
        );
        assert_eq!(err.operator(), Some("MISO"));
        assert!(err.is_retryable());

        let untagged = ProviderError::not_found("https://www.pjm.com/x.ics not found");
        assert_eq!(untagged.to_string(), "not_found: https://www.pjm.com/x.ics not found");
    }

    #[test]
    fn json_errors_are_invalid_responses() {
        use std::error::Error;
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ProviderError::from(json_err);
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        assert!(err.message().starts_with("malformed JSON"));
        assert!(err.source().is_some());
    }

    #[test]
    fn url_errors_are_configuration_errors() {
        let err = ProviderError::from(url::Url::parse("not a url").unwrap_err());
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }
}

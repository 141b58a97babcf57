//! CLI error types.

use std::path::PathBuf;

use gridcal_providers::ProviderError;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that end a `gridcal` invocation with a failure exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid configuration values.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected shape.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Retrieval error outside a per-source run (e.g. HTTP client setup).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid combination of arguments.
    #[error("{0}")]
    Usage(String),

    /// Some sources failed during `fetch`.
    #[error("{failed} of {total} sources failed")]
    SourcesFailed {
        /// Failed sources.
        failed: usize,
        /// Sources attempted.
        total: usize,
    },

    /// Some feeds failed `validate`.
    #[error("{failed} of {total} feeds failed validation")]
    ValidationFailed {
        /// Failing feeds.
        failed: usize,
        /// Feeds checked.
        total: usize,
    },
}

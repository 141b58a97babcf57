//! Logging setup shared by the gridcal binaries.
//!
//! Diagnostics always go to stderr: stdout carries the user-facing output
//! (validation tables, write summaries) and must stay parseable.
//!
//! ```ignore
//! use gridcal_core::tracing::{init_tracing, TracingConfig};
//!
//! // Interactive run: warnings only, compact.
//! init_tracing(TracingConfig::interactive())?;
//!
//! // Scheduled run (CI, cron) shipping JSON lines to a collector.
//! init_tracing(TracingConfig::scheduled())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Target prefix shared by every gridcal crate.
const TARGET_PREFIX: &str = "gridcal";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The filter directive does not parse.
    #[error("failed to parse log filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line, human-readable
    Pretty,
    /// Single line per event
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for TracingOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format '{}' (expected pretty, compact or json)",
                other
            )),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for gridcal targets when neither `RUST_LOG` nor `filter` is set.
    pub level: Level,
    /// Line layout.
    pub format: TracingOutputFormat,
    /// Print file and line of each event.
    pub location: bool,
    /// Print timestamps.
    pub timestamps: bool,
    /// Explicit filter directive, taking precedence over `RUST_LOG`.
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

impl TracingConfig {
    /// Terminal use: warnings and errors, compact, no timestamps.
    #[must_use]
    pub fn interactive() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            location: false,
            timestamps: false,
            filter: None,
        }
    }

    /// `--debug`: per-request and per-block detail with source locations.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            location: true,
            ..Self::interactive()
        }
    }

    /// Unattended runs: progress at info level as timestamped JSON.
    #[must_use]
    pub fn scheduled() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Json,
            location: false,
            timestamps: true,
            filter: None,
        }
    }

    /// Set the level for gridcal targets
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the line layout
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set an explicit filter directive
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The directive used when `RUST_LOG` is unset: gridcal targets at
    /// `level`, everything else (reqwest, hyper) at warn.
    pub fn default_directive(&self) -> String {
        format!("warn,{}={}", TARGET_PREFIX, self.level.to_string().to_ascii_lowercase())
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref filter) = self.filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or the filter
/// directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;
    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.location)
        .with_line_number(config.location)
        .with_target(config.location);

    let layer = match (config.format, config.timestamps) {
        (TracingOutputFormat::Json, _) => base.json().boxed(),
        (TracingOutputFormat::Pretty, true) => base.pretty().boxed(),
        (TracingOutputFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (TracingOutputFormat::Compact, true) => base.compact().boxed(),
        (TracingOutputFormat::Compact, false) => base.compact().without_time().boxed(),
    };

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(filter).with(layer))?;
    Ok(())
}

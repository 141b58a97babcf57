//! Configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/gridcal/config.toml` by default. Every section and key is
//! optional:
//!
//! ```toml
//! [fetch]
//! months = 3
//! output_dir = "output"
//! timeout_secs = 30
//! pause_every = 10
//! pause_ms = 500
//! ercot_batch_size = 50
//!
//! [[validate.feeds]]
//! name = "PJM"
//! location = "https://example.org/calendars/pjm.ics"
//!
//! [[validate.feeds]]
//! name = "LOCAL"
//! location = "output/pjm.ics"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use gridcal_providers::fetch::DEFAULT_USER_AGENT;
use gridcal_providers::{HttpConfig, Source, SyncOptions};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

const PUBLISHED_FEEDS_BASE: &str = "https://czawora.github.io/iso-calendars";

/// Row order of the default validation table.
const PUBLISHED_FEED_ORDER: [Source; 7] = [
    Source::Caiso,
    Source::Spp,
    Source::Miso,
    Source::Pjm,
    Source::Nyiso,
    Source::Isone,
    Source::Ercot,
];

/// Configuration for the gridcal CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridcalConfig {
    /// Debug mode.
    pub debug: bool,

    /// Retrieval settings.
    pub fetch: FetchSettings,

    /// Feed validation settings.
    pub validate: ValidateSettings,
}

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Months ahead to fetch, starting with the current month.
    pub months: u32,

    /// Directory receiving `<slug>.ics` files.
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// `User-Agent` header.
    pub user_agent: String,

    /// Per-event downloads between politeness pauses (0 disables).
    pub pause_every: usize,

    /// Pause length in milliseconds.
    pub pause_ms: u64,

    /// Ids per ERCOT batch download.
    pub ercot_batch_size: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        let sync = SyncOptions::default();
        Self {
            months: sync.months,
            output_dir: PathBuf::from("output"),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pause_every: sync.pause_every,
            pause_ms: sync.pause.as_millis() as u64,
            ercot_batch_size: sync.ercot_batch_size,
        }
    }
}

impl FetchSettings {
    /// Pipeline options, with `months` overriding the configured value.
    pub fn sync_options(&self, months: Option<u32>) -> SyncOptions {
        SyncOptions::default()
            .with_months(months.unwrap_or(self.months))
            .with_pause(self.pause_every, Duration::from_millis(self.pause_ms))
            .with_ercot_batch_size(self.ercot_batch_size)
    }

    /// HTTP client settings.
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_user_agent(&self.user_agent)
    }
}

/// Feed validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateSettings {
    /// Feeds checked by `gridcal validate` without arguments, in report order.
    pub feeds: Vec<FeedEntry>,
}

/// One row of the validation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Label printed in the report.
    pub name: String,
    /// File path or http(s) URL.
    pub location: String,
}

impl Default for ValidateSettings {
    fn default() -> Self {
        let feeds = PUBLISHED_FEED_ORDER
            .iter()
            .map(|source| FeedEntry {
                name: source.name().to_string(),
                location: format!("{}/{}", PUBLISHED_FEEDS_BASE, source.file_name()),
            })
            .collect();
        Self { feeds }
    }
}

impl GridcalConfig {
    /// Loads configuration from the default path, or defaults if it does
    /// not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridcal")
    }

    /// Checks values that parse but cannot work.
    pub fn check(&self) -> CliResult<()> {
        let fetch = &self.fetch;
        if fetch.months == 0 {
            return Err(CliError::Config("fetch.months must be at least 1".into()));
        }
        if fetch.timeout_secs == 0 {
            return Err(CliError::Config("fetch.timeout_secs must be at least 1".into()));
        }
        if fetch.ercot_batch_size == 0 {
            return Err(CliError::Config(
                "fetch.ercot_batch_size must be at least 1".into(),
            ));
        }
        if self.validate.feeds.is_empty() {
            return Err(CliError::Config("validate.feeds must not be empty".into()));
        }
        for feed in &self.validate.feeds {
            if feed.name.trim().is_empty() {
                return Err(CliError::Config(format!(
                    "validate.feeds: entry for {} has no name",
                    feed.location
                )));
            }
            if feed.location.starts_with("http://") || feed.location.starts_with("https://") {
                url::Url::parse(&feed.location).map_err(|e| {
                    CliError::Config(format!("validate.feeds.{}: invalid URL: {}", feed.name, e))
                })?;
            }
        }
        Ok(())
    }
}

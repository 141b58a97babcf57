//! `gridcal validate`: structural checks of published calendar files.

use gridcal_core::{ValidationReport, validate_document};
use gridcal_providers::{FetchRequest, Fetcher, HttpFetcher, Source};
use tracing::{debug, warn};

use crate::config::GridcalConfig;
use crate::error::{CliError, CliResult};

/// A calendar file to check, local or remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Label printed in the summary row.
    pub name: String,
    /// File path or http(s) URL.
    pub location: String,
}

impl Target {
    /// Creates a target with an explicit label.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Derives the label from the file name of `location`.
    ///
    /// `out/pjm.ics` and `https://host/feeds/pjm.ics?x=1` both become `PJM`.
    pub fn from_arg(location: &str) -> Self {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        let file = path
            .trim_end_matches('/')
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path);
        let stem = file.strip_suffix(".ics").unwrap_or(file);
        let name = match stem.parse::<Source>() {
            Ok(source) => source.name().to_string(),
            Err(_) => stem.to_string(),
        };
        Self::new(name, location)
    }

    /// Returns `true` for http(s) locations.
    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }
}

/// Outcome of checking one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetReport {
    /// The document was loaded and checked.
    Checked(ValidationReport),
    /// The document could not be loaded.
    Unreadable(String),
}

impl TargetReport {
    /// Returns `true` if the target loaded and passed.
    pub fn passed(&self) -> bool {
        matches!(self, Self::Checked(report) if report.passed())
    }

    /// Formats one summary row.
    pub fn row(&self, name: &str) -> String {
        match self {
            Self::Checked(report) => report.summary_row(name),
            Self::Unreadable(error) => format!("{:8} | FAIL could not load: {}", name, error),
        }
    }
}

async fn load(target: &Target, fetcher: &dyn Fetcher) -> Result<String, String> {
    if target.is_remote() {
        let request = FetchRequest::get(&target.location).map_err(|e| e.to_string())?;
        fetcher.fetch(&request).await.map_err(|e| e.to_string())
    } else {
        tokio::fs::read_to_string(&target.location)
            .await
            .map_err(|e| format!("{}: {}", target.location, e))
    }
}

/// Loads and checks every target, in order.
pub async fn check_all(targets: &[Target], fetcher: &dyn Fetcher) -> Vec<TargetReport> {
    let mut reports = Vec::with_capacity(targets.len());
    for target in targets {
        let report = match load(target, fetcher).await {
            Ok(text) => {
                let report = validate_document(&text);
                debug!(target = %target.name, events = report.event_count, passed = report.passed(), "validated");
                TargetReport::Checked(report)
            }
            Err(error) => {
                warn!(target = %target.name, error = %error, "could not load calendar");
                TargetReport::Unreadable(error)
            }
        };
        reports.push(report);
    }
    reports
}

/// Targets from the command line, or the configured feeds when none are given.
pub fn resolve_targets(config: &GridcalConfig, args: &[String]) -> Vec<Target> {
    if args.is_empty() {
        config
            .validate
            .feeds
            .iter()
            .map(|feed| Target::new(feed.name.clone(), feed.location.clone()))
            .collect()
    } else {
        args.iter().map(|arg| Target::from_arg(arg)).collect()
    }
}

/// Entry point of `gridcal validate`.
pub async fn run(config: &GridcalConfig, args: &[String]) -> CliResult<()> {
    config.check()?;
    let targets = resolve_targets(config, args);
    let fetcher = HttpFetcher::new(&config.fetch.http_config())?;

    let reports = check_all(&targets, &fetcher).await;
    for (target, report) in targets.iter().zip(&reports) {
        println!("{}", report.row(&target.name));
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        return Err(CliError::ValidationFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcal_providers::{BoxFuture, ProviderError, ProviderResult};

    const GOOD: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//PJM Calendar Sync//EN\r\n\
        BEGIN:VEVENT\r\nUID:a@pjm\r\nDTSTART:20251204T140000Z\r\nSUMMARY:MC\r\nEND:VEVENT\r\n\
        END:VCALENDAR\r\n";

    struct OneFeed;

    impl Fetcher for OneFeed {
        fn fetch<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, ProviderResult<String>> {
            let result = if request.url().path() == "/feeds/pjm.ics" {
                Ok(GOOD.to_string())
            } else {
                Err(ProviderError::not_found(format!("{} not found", request.url())))
            };
            Box::pin(async move { result })
        }
    }

    #[test]
    fn names_from_locations() {
        assert_eq!(Target::from_arg("output/pjm.ics").name, "PJM");
        assert_eq!(Target::from_arg("https://host/feeds/isone.ics?v=2").name, "ISO-NE");
        assert_eq!(Target::from_arg("backup/custom.ics").name, "custom");
        assert!(Target::from_arg("http://host/x.ics").is_remote());
        assert!(!Target::from_arg("x.ics").is_remote());
    }

    #[test]
    fn configured_feeds_when_no_arguments() {
        let config = GridcalConfig::default();
        let targets = resolve_targets(&config, &[]);
        assert_eq!(targets.len(), 7);
        assert_eq!(targets[0].name, "CAISO");
        assert_eq!(targets[1].name, "SPP");

        let targets = resolve_targets(&config, &["a/spp.ics".to_string()]);
        assert_eq!(targets, [Target::new("SPP", "a/spp.ics")]);
    }

    #[tokio::test]
    async fn checks_files_and_urls() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("pjm.ics");
        let bad = dir.path().join("spp.ics");
        std::fs::write(&good, GOOD).unwrap();
        std::fs::write(&bad, GOOD.replace("END:VEVENT\r\n", "")).unwrap();

        let targets = vec![
            Target::from_arg(&good.to_string_lossy()),
            Target::from_arg(&bad.to_string_lossy()),
            Target::from_arg("https://cal.example.org/feeds/pjm.ics"),
            Target::from_arg("https://cal.example.org/feeds/miso.ics"),
            Target::from_arg(&dir.path().join("missing.ics").to_string_lossy()),
        ];
        let reports = check_all(&targets, &OneFeed).await;

        let passed: Vec<_> = reports.iter().map(TargetReport::passed).collect();
        assert_eq!(passed, [true, false, true, false, false]);
        assert!(matches!(&reports[0], TargetReport::Checked(r) if r.event_count == 1));
        assert!(reports[3].row("MISO").starts_with("MISO     | FAIL could not load: not_found"));
        assert!(matches!(reports[4], TargetReport::Unreadable(_)));
    }
}

//! `gridcal fetch`: run operator pipelines and write their documents.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gridcal_core::Document;
use gridcal_providers::{Fetcher, HttpFetcher, Source, SyncOptions, SyncOutcome, sync};
use tracing::{debug, error};

use crate::config::GridcalConfig;
use crate::error::{CliError, CliResult};

/// What to fetch and where to write it.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    /// Operators, in run order.
    pub sources: Vec<Source>,
    /// Pipeline options.
    pub options: SyncOptions,
    /// Directory for `<slug>.ics` files.
    pub output_dir: PathBuf,
    /// Explicit output file, single-operator runs only.
    pub output: Option<PathBuf>,
}

impl FetchPlan {
    /// Builds a plan from configuration and command-line overrides.
    pub fn new(
        config: &GridcalConfig,
        sources: Vec<Source>,
        months: Option<u32>,
        output: Option<PathBuf>,
    ) -> CliResult<Self> {
        if output.is_some() && sources.len() != 1 {
            return Err(CliError::Usage(
                "--output can only be used with a single source".to_string(),
            ));
        }
        if months == Some(0) {
            return Err(CliError::Usage("--months must be at least 1".to_string()));
        }
        Ok(Self {
            sources,
            options: config.fetch.sync_options(months),
            output_dir: config.fetch.output_dir.clone(),
            output,
        })
    }

    /// Where the document of `source` is written.
    pub fn output_path(&self, source: Source) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.output_dir.join(source.file_name()))
    }
}

/// Per-operator result of a fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceReport {
    /// Document written.
    Written {
        /// Operator.
        source: Source,
        /// Output file.
        path: PathBuf,
        /// Events in the document.
        events: usize,
    },
    /// Nothing to write.
    Empty {
        /// Operator.
        source: Source,
    },
    /// Retrieval or writing failed.
    Failed {
        /// Operator.
        source: Source,
        /// Error message.
        error: String,
    },
}

impl SourceReport {
    /// Returns `true` for failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Runs every operator of `plan` in sequence. One operator failing does not
/// stop the others.
pub async fn run_plan(
    plan: &FetchPlan,
    fetcher: &dyn Fetcher,
    now: DateTime<Utc>,
) -> Vec<SourceReport> {
    let mut reports = Vec::with_capacity(plan.sources.len());
    for &source in &plan.sources {
        let report = match sync::run(source, fetcher, &plan.options, now).await {
            Ok(SyncOutcome::Built { document, stats }) => {
                debug!(source = %source, stats = ?stats, "writing document");
                let path = plan.output_path(source);
                match write_document(&document, &path).await {
                    Ok(()) => SourceReport::Written {
                        source,
                        path,
                        events: document.events().len(),
                    },
                    Err(err) => SourceReport::Failed {
                        source,
                        error: format!("failed to write {}: {}", path.display(), err),
                    },
                }
            }
            Ok(SyncOutcome::Empty { .. }) => SourceReport::Empty { source },
            Err(err) => {
                error!(source = %source, error = %err, "fetch failed");
                SourceReport::Failed {
                    source,
                    error: err.to_string(),
                }
            }
        };
        reports.push(report);
    }
    reports
}

async fn write_document(document: &Document, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, document.render()).await
}

/// Entry point of `gridcal fetch`.
pub async fn run(
    config: &GridcalConfig,
    sources: Vec<Source>,
    months: Option<u32>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    config.check()?;
    let plan = FetchPlan::new(config, sources, months, output)?;
    let fetcher = HttpFetcher::new(&config.fetch.http_config())?;

    let reports = run_plan(&plan, &fetcher, Utc::now()).await;
    for report in &reports {
        match report {
            SourceReport::Written {
                source,
                path,
                events,
            } => println!("{}: wrote {} events to {}", source, events, path.display()),
            SourceReport::Empty { source } => println!("{}: no events found, nothing written", source),
            SourceReport::Failed { source, error } => eprintln!("{}: {}", source, error),
        }
    }

    let failed = reports.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        return Err(CliError::SourcesFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

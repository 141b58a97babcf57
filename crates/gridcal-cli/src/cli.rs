//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gridcal_core::TracingOutputFormat;
use gridcal_providers::Source;

/// gridcal - Grid operator event calendars, merged and validated
#[derive(Debug, Parser)]
#[command(name = "gridcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "GRIDCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format (pretty, compact, json)
    #[arg(long, env = "GRIDCAL_LOG_FORMAT")]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch operator calendars and write one merged .ics file per operator
    Fetch {
        /// Operators to fetch (caiso, ercot, isone, miso, nyiso, pjm, spp)
        #[arg(required_unless_present = "all")]
        sources: Vec<Source>,

        /// Fetch every operator
        #[arg(long, conflicts_with = "sources")]
        all: bool,

        /// Months ahead to fetch, starting with the current month
        #[arg(long, short)]
        months: Option<u32>,

        /// Output file (only with a single operator)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Check published calendar files for structural problems
    Validate {
        /// Files or http(s) URLs; defaults to the configured feeds
        targets: Vec<String>,
    },

    /// List supported operators
    Sources,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

impl Command {
    /// Operators selected by a `fetch` command, in run order.
    pub fn selected_sources(sources: &[Source], all: bool) -> Vec<Source> {
        if all {
            return Source::ALL.to_vec();
        }
        let mut selected = Vec::with_capacity(sources.len());
        for source in sources {
            if !selected.contains(source) {
                selected.push(*source);
            }
        }
        selected
    }
}

//! Command-line interface for gridcal.
//!
//! This crate provides the `gridcal` binary: fetching operator calendars,
//! validating published feeds and inspecting configuration.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::GridcalConfig;
pub use error::{CliError, CliResult};

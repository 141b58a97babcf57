//! Subcommand implementations.

pub mod config;
pub mod fetch;
pub mod sources;
pub mod validate;

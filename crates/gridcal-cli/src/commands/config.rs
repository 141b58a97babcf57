//! Configuration commands.

use std::path::Path;

use crate::config::GridcalConfig;
use crate::error::CliResult;

/// Dump the current configuration to stdout.
pub fn dump(config: &GridcalConfig, path: &Path) -> CliResult<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &GridcalConfig) -> CliResult<()> {
    config.check()?;
    println!(
        "Configuration is valid ({} validation feeds, {} months ahead).",
        config.validate.feeds.len(),
        config.fetch.months
    );
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> CliResult<()> {
    let state = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("config: {}{}", path.display(), state);
    Ok(())
}

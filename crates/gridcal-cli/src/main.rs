//! gridcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use gridcal_core::{TracingConfig, TracingOutputFormat, init_tracing};

use gridcal_cli::cli::{Cli, Command, ConfigAction};
use gridcal_cli::commands;
use gridcal_cli::config::GridcalConfig;
use gridcal_cli::error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_config(&cli);

    let debug = cli.debug || config.as_ref().is_ok_and(|c| c.debug);
    if let Err(e) = init_tracing(tracing_config(debug, cli.log_format)) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> CliResult<GridcalConfig> {
    match cli.config {
        Some(ref path) => GridcalConfig::load_from(path),
        None => GridcalConfig::load(),
    }
}

fn tracing_config(debug: bool, format: Option<TracingOutputFormat>) -> TracingConfig {
    let config = match format {
        _ if debug => TracingConfig::debug(),
        Some(TracingOutputFormat::Json) => TracingConfig::scheduled(),
        _ => TracingConfig::interactive(),
    };
    match format {
        Some(format) => config.with_format(format),
        None => config,
    }
}

async fn run(cli: Cli, config: CliResult<GridcalConfig>) -> CliResult<()> {
    let config = config?;
    let path = cli.config.unwrap_or_else(GridcalConfig::default_path);

    match cli.command {
        Command::Fetch {
            sources,
            all,
            months,
            output,
        } => {
            let sources = Command::selected_sources(&sources, all);
            commands::fetch::run(&config, sources, months, output).await
        }
        Command::Validate { targets } => commands::validate::run(&config, &targets).await,
        Command::Sources => {
            commands::sources::list();
            Ok(())
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&path),
        },
    }
}

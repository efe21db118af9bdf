//! romsync CLI - keep emulator saves in sync with a RomM server
//!
//! One-shot scans, dry-run plans and sync cycles from the terminal.

mod cli;
mod commands;
mod config_file;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::plan::run_plan;
use crate::commands::scan::run_scan;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Scan { json } => run_scan(json, config_path)?,
        Commands::Plan { json } => run_plan(json, config_path).await?,
        Commands::Sync { json } => run_sync(json, config_path).await?,
        Commands::Config { command } => run_config(command, config_path)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<(), CliError> {
    let directive = default_log_directive(verbose)
        .parse::<Directive>()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

const fn default_log_directive(verbose: bool) -> &'static str {
    if verbose {
        "romsync=debug"
    } else {
        "romsync=info"
    }
}

//! Versentry CLI entry point.
//!
//! Loads the configuration, opens the inventory store, runs one sweep and
//! prints a summary. Exit code 0 means the sweep ran to completion; any error
//! that aborts the run exits 1.

mod cli;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::{error, info};

use versentry_core::config::VersentryConfig;
use versentry_inventory::{HostIdentity, InventoryScannerBuilder, SqliteStore, SweepReport};

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::SweepSummary;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config_path();
    let config = VersentryConfig::load(&config_path).await?;

    let log_file = logging::init_tracing(&config.general)?;
    versentry_core::metrics::describe_all();
    info!(
        config = %config_path.display(),
        database = %config.database.database,
        folders = config.folders.len(),
        "configuration loaded"
    );

    let report = tokio::task::spawn_blocking(move || sweep(&config))
        .await
        .map_err(|e| CliError::Scan(format!("sweep task failed: {e}")))?
        .inspect_err(|e| error!(error = %e, "sweep aborted"))?;

    output::print(&SweepSummary {
        report: &report,
        log_file: log_file.as_deref(),
    })?;

    Ok(())
}

/// Blocking sweep: open the store, load the catalog, scan every folder.
fn sweep(config: &VersentryConfig) -> Result<SweepReport, CliError> {
    let store = SqliteStore::from_config(&config.database)?;
    let host = HostIdentity::detect();
    info!(host = %host.name, ips = %host.ips, "host identified");

    let mut scanner = InventoryScannerBuilder::new(store)
        .config(config)
        .host(host)
        .build()?;

    Ok(scanner.run()?)
}

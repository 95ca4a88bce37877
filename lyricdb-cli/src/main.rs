//! lyricdb - command-line entry point
//!
//! Starts logging, loads configuration, starts an I/O runtime sized from
//! `runtime.io_worker_threads`, runs one command and prints its terminal
//! result as JSON. Exits with status 1 when the command ends in an error.

use anyhow::{Context, Result};
use clap::Parser;
use lyricdb_cli::cli::{Cli, Command};
use lyricdb_cli::commands::{self, Outcome};
use lyricdb_cli::logging;
use lyricdb_common::config::{load_config, TomlConfig};
use lyricdb_core::LyricService;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let explicit = std::env::var("RUST_LOG")
        .ok()
        .or_else(|| cli.log_level.clone());
    let log_filter = logging::init(explicit.as_deref())?;

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    log_filter.apply_configured(&config.logging.level)?;

    info!(
        "Starting lyricdb v{} ({} I/O workers)",
        env!("CARGO_PKG_VERSION"),
        config.runtime.io_worker_threads
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runtime.io_worker_threads.max(1))
        .thread_name("lyricdb-io")
        .enable_all()
        .build()
        .context("Failed to build I/O runtime")?;

    let outcome = runtime.block_on(run(config, cli.command))?;
    println!("{}", outcome.to_json()?);

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(config: TomlConfig, command: Command) -> Result<Outcome> {
    let service = LyricService::from_config(&config)
        .await
        .context("Failed to open lyric service")?;

    let outcome = commands::execute(&service, command).await;

    // Background index and not-found writes finish before exit
    service.shutdown().await;
    outcome
}

//! droidtail CLI - terminal log viewer for Android debug bridge devices.
//!
//! Wraps the droidtail-core engine: device listing, continuous tailing,
//! one-shot snapshots, buffer clearing, and settings management.

mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use droidtail_core::{AdbBridge, Settings};
use error::exit_codes;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "droidtail=debug,droidtail_core=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> error::Result<()> {
    let settings = Settings::load()?;
    let bridge = make_bridge(&cli, &settings);

    match cli.command {
        Commands::Devices(args) => {
            commands::run_devices(&bridge, args, cli.json, cli.verbose).await
        }
        Commands::Tail(args) => commands::run_tail(Arc::new(bridge), args, &settings).await,
        Commands::Log(args) => commands::run_log(&bridge, args, &settings, cli.json).await,
        Commands::Clear(args) => commands::run_clear(&bridge, args, cli.json).await,
        Commands::Config(args) => commands::run_config(args, cli.json),
    }
}

/// Explicit --adb wins over the saved setting, which wins over discovery.
fn make_bridge(cli: &Cli, settings: &Settings) -> AdbBridge {
    let bridge = match cli.adb.clone().or_else(|| settings.adb_path.clone()) {
        Some(path) => AdbBridge::with_path(path),
        None => AdbBridge::new(),
    };
    bridge.with_timeout(Duration::from_millis(cli.timeout))
}

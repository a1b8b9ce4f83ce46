//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use droidtail_core::Severity;

/// droidtail - log viewer for Android debug bridge devices
#[derive(Parser, Debug)]
#[command(name = "droidtail")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Bridge command timeout in milliseconds
    #[arg(long, global = true, default_value = "5000", env = "DROIDTAIL_TIMEOUT")]
    pub timeout: u64,

    /// Path to the adb executable (overrides settings and discovery)
    #[arg(long, global = true, env = "DROIDTAIL_ADB")]
    pub adb: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List connected devices
    Devices(DevicesArgs),

    /// Continuously poll a device log
    Tail(TailArgs),

    /// Fetch one log snapshot
    Log(LogArgs),

    /// Clear a device-side log buffer
    Clear(ClearArgs),

    /// Settings management
    Config(ConfigArgs),
}

// ==================== Devices ====================

#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// Include devices that are not ready (unauthorized, offline)
    #[arg(short, long)]
    pub all: bool,
}

// ==================== Tail ====================

#[derive(Args, Debug)]
pub struct TailArgs {
    /// Device serial (default: first ready device)
    pub device: Option<String>,

    /// Minimum severity to request (verbose, debug, info, warning, error)
    #[arg(short, long)]
    pub level: Option<Severity>,

    /// Snapshot window in lines (50, 100, 200, 500)
    #[arg(short = 'n', long)]
    pub lines: Option<u32>,

    /// Poll interval in milliseconds
    #[arg(long)]
    pub interval: Option<u64>,
}

// ==================== Log ====================

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Device serial
    pub device: String,

    /// Minimum severity to request (verbose, debug, info, warning, error)
    #[arg(short, long)]
    pub level: Option<Severity>,

    /// Snapshot window in lines (50, 100, 200, 500)
    #[arg(short = 'n', long)]
    pub lines: Option<u32>,
}

// ==================== Clear ====================

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Device serial
    pub device: String,
}

// ==================== Config ====================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current settings and their file location
    Show,

    /// Set a setting (keys: interval, level, lines, adb-path)
    Set(ConfigSetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Setting key
    pub key: String,

    /// New value
    pub value: String,
}

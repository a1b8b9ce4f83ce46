//! Settings management command.

use std::path::PathBuf;

use droidtail_core::{Settings, Severity, WindowSize};

use crate::cli::{ConfigArgs, ConfigCommands, ConfigSetArgs};
use crate::error::{CliError, Result};
use crate::output::get_formatter;

/// Run the config command.
pub fn run_config(args: ConfigArgs, json: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show(json),
        ConfigCommands::Set(set) => apply(set, json),
    }
}

fn show(json: bool) -> Result<()> {
    let settings = Settings::load()?;
    let path = Settings::default_path()?;
    println!(
        "{}",
        get_formatter(json).format_settings(&settings, &path.display().to_string())
    );
    Ok(())
}

fn apply(set: ConfigSetArgs, json: bool) -> Result<()> {
    let mut settings = Settings::load()?;

    match set.key.as_str() {
        "interval" => {
            let ms: u64 = set
                .value
                .parse()
                .map_err(|_| CliError::InvalidArgument(format!("Invalid interval: {}", set.value)))?;
            if ms == 0 {
                return Err(CliError::InvalidArgument(
                    "Interval must be greater than zero".to_string(),
                ));
            }
            settings.poll_interval_ms = ms;
        }
        "level" => {
            settings.floor = set
                .value
                .parse::<Severity>()
                .map_err(CliError::InvalidArgument)?;
        }
        "lines" => {
            let n: u32 = set
                .value
                .parse()
                .map_err(|_| CliError::InvalidArgument(format!("Invalid line count: {}", set.value)))?;
            settings.window = WindowSize::new(n).map_err(CliError::InvalidArgument)?;
        }
        "adb-path" => {
            settings.adb_path = Some(PathBuf::from(&set.value));
        }
        other => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown setting: {} (expected interval, level, lines, adb-path)",
                other
            )));
        }
    }

    settings.save()?;
    println!(
        "{}",
        get_formatter(json).format_message(&format!("Saved {} = {}", set.key, set.value))
    );
    Ok(())
}

//! One-shot log snapshot command.

use droidtail_core::{classify, AdbBridge, Bridge, Settings, WindowSize};

use crate::cli::LogArgs;
use crate::error::{CliError, Result};
use crate::output::get_formatter;

/// Run the log command: one fetch, classify, print.
pub async fn run_log(
    bridge: &AdbBridge,
    args: LogArgs,
    settings: &Settings,
    json: bool,
) -> Result<()> {
    let floor = args.level.unwrap_or(settings.floor);
    let window = match args.lines {
        Some(n) => WindowSize::new(n).map_err(CliError::InvalidArgument)?,
        None => settings.window,
    };

    let text = bridge
        .get_log(&args.device, window.lines(), floor.bridge_token())
        .await?;
    let lines = classify::classify_snapshot(&text);

    println!("{}", get_formatter(json).format_log(&lines));
    Ok(())
}

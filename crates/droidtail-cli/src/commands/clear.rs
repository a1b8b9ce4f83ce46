//! Device log buffer clear command.

use colored::*;
use droidtail_core::{AdbBridge, Bridge, CoreError};

use crate::cli::ClearArgs;
use crate::error::{CliError, Result};
use crate::output::get_formatter;

/// Run the clear command.
pub async fn run_clear(bridge: &AdbBridge, args: ClearArgs, json: bool) -> Result<()> {
    match bridge.clear_log(&args.device).await {
        Ok(()) => {
            let message = format!("Log buffer cleared on {}", args.device);
            if json {
                println!("{}", get_formatter(true).format_message(&message));
            } else {
                println!("{} {}", "[OK]".green(), message);
            }
            Ok(())
        }
        Err(e) => Err(CliError::Core(CoreError::ClearFailed {
            device: args.device,
            message: e.to_string(),
        })),
    }
}

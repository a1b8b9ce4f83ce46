//! Device listing command.

use colored::*;
use droidtail_core::{registry, AdbBridge, Bridge, CoreError};
use tracing::debug;

use crate::cli::DevicesArgs;
use crate::error::Result;
use crate::output::get_formatter;

/// Run the devices command.
///
/// An unreachable bridge is reported as a warning plus an empty list, not a
/// hard failure, so scripts can poll this while the daemon comes up.
pub async fn run_devices(
    bridge: &AdbBridge,
    args: DevicesArgs,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(json);

    if verbose {
        match bridge.version().await {
            Ok(version) => debug!(%version, "bridge reachable"),
            Err(e) => debug!(error = %e, "bridge version probe failed"),
        }
    }

    let result = if args.all {
        bridge.list_devices().await
    } else {
        registry::list_ready_devices(bridge).await
    };

    match result {
        Ok(devices) => {
            println!("{}", formatter.format_devices(&devices));
            Ok(())
        }
        Err(CoreError::BridgeUnavailable(msg)) => {
            eprintln!("{} bridge unavailable: {}", "Warning:".yellow(), msg);
            println!("{}", formatter.format_devices(&[]));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

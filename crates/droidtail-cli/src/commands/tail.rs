//! Continuous log tail command.
//!
//! Drives a [`LogSession`] and renders each published snapshot. When a new
//! snapshot extends the previous buffer, only the fresh suffix is printed;
//! when the buffer was replaced (filter change, clear, reconnect) a
//! separator marks the break.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use colored::*;
use droidtail_core::{
    registry, AdbBridge, ClassifiedLine, FilterConfig, LogSession, SessionPhase, Settings,
    WindowSize,
};
use tracing::debug;

use crate::cli::TailArgs;
use crate::error::{CliError, Result};
use crate::output::table::colorize_line;

const DEVICE_WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Run the tail command until Ctrl+C or the device disappears.
pub async fn run_tail(
    bridge: Arc<AdbBridge>,
    args: TailArgs,
    settings: &Settings,
) -> Result<()> {
    let devices = registry::list_ready_devices(bridge.as_ref()).await?;

    let device = match args.device {
        Some(id) => devices
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.id.clone())
            .ok_or(CliError::DeviceNotReady(id))?,
        None => devices
            .first()
            .map(|d| d.id.clone())
            .ok_or(CliError::NoDevicesFound)?,
    };

    let floor = args.level.unwrap_or(settings.floor);
    let window = match args.lines {
        Some(n) => WindowSize::new(n).map_err(CliError::InvalidArgument)?,
        None => settings.window,
    };
    let interval = args
        .interval
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.poll_interval());

    let session = LogSession::with_interval(Arc::clone(&bridge), interval);
    let mut rx = session.subscribe();
    session.set_filter(FilterConfig::new(floor, window));
    session.select_device(&device);

    println!(
        "Tailing {} (level >= {}, {} lines, every {} ms) since {}",
        device,
        floor,
        window,
        interval.as_millis(),
        chrono::Local::now().format("%H:%M:%S")
    );
    println!("Press Ctrl+C to stop.\n");

    let mut printed: Arc<Vec<ClassifiedLine>> = Arc::new(Vec::new());
    let mut reported_error: Option<String> = None;
    let mut device_watch = tokio::time::interval(DEVICE_WATCH_INTERVAL);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            _ = device_watch.tick() => {
                match registry::list_ready_devices(bridge.as_ref()).await {
                    Ok(devices) => {
                        session.sync_devices(&devices);
                        if session.phase() == SessionPhase::Idle {
                            eprintln!("{} device {} disconnected", "Warning:".yellow(), device);
                            break;
                        }
                    }
                    Err(e) => debug!(error = %e, "device watch query failed"),
                }
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();

                if snapshot.last_error != reported_error {
                    if let Some(err) = &snapshot.last_error {
                        eprintln!("{} {}", "Warning:".yellow(), err);
                    }
                    reported_error = snapshot.last_error.clone();
                }

                print_delta(&printed, &snapshot.lines);
                printed = snapshot.lines;
            }
        }
    }

    session.dispose();
    Ok(())
}

/// Print what changed between two snapshot buffers.
fn print_delta(prev: &[ClassifiedLine], next: &[ClassifiedLine]) {
    let extends = prev.len() <= next.len() && &next[..prev.len()] == prev;

    let fresh = if extends {
        &next[prev.len()..]
    } else {
        if !prev.is_empty() {
            println!("{}", "---- snapshot replaced ----".dimmed());
        }
        next
    };

    for line in fresh {
        println!("{}", colorize_line(line));
    }
    if !fresh.is_empty() {
        io::stdout().flush().ok();
    }
}

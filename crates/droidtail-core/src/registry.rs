//! Device registry: stateless ready-device snapshots.
//!
//! Each query hits the bridge fresh and returns a new set with no
//! carry-over, so callers detect removals by comparing snapshots.

use crate::bridge::Bridge;
use crate::error::Result;
use crate::types::Device;

/// Query the bridge once and return the selectable devices, in
/// bridge-reported order. Only `Ready` devices are included.
pub async fn list_ready_devices<B: Bridge>(bridge: &B) -> Result<Vec<Device>> {
    let devices = bridge.list_devices().await?;
    Ok(devices.into_iter().filter(Device::is_ready).collect())
}

//! Device-bridge communication layer.
//!
//! The engine talks to the external debug bridge through the [`Bridge`]
//! trait; [`AdbBridge`] is the production implementation over the `adb`
//! executable. Tests substitute their own implementations.

pub mod adb;
pub mod commands;

use std::future::Future;

use crate::error::Result;
use crate::types::Device;

pub use adb::AdbBridge;
pub use commands::BridgeCommand;

/// Request/response boundary to the external bridge process.
///
/// Methods return `Send` futures so session tasks can run them off-task.
pub trait Bridge: Send + Sync + 'static {
    /// Query the connected-device set. Fresh snapshot on every call.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>>> + Send;

    /// Fetch a bounded snapshot of the device log: the newest `lines`
    /// entries, optionally restricted by a `*:<LEVEL>` filterspec.
    fn get_log(
        &self,
        device_id: &str,
        lines: u32,
        filter: Option<&'static str>,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Destructively clear the device-side log buffer.
    fn clear_log(&self, device_id: &str) -> impl Future<Output = Result<()>> + Send;
}

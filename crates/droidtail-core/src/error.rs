//! Error types for the droidtail core.

use thiserror::Error;

/// Core error type for bridge and session operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The bridge process could not be reached or executed.
    #[error("Bridge unavailable: {0}")]
    BridgeUnavailable(String),

    /// The target device dropped between calls.
    #[error("Device disconnected: {0}")]
    DeviceDisconnected(String),

    /// The bridge rejected an explicit clear command.
    #[error("Clear failed on {device}: {message}")]
    ClearFailed { device: String, message: String },

    /// An operation was attempted with no device selected.
    #[error("No device selected")]
    NoDeviceSelected,

    /// The bridge ran but reported a command failure.
    #[error("Bridge command failed: {0}")]
    CommandFailed(String),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether a running session should survive this error and keep polling.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::BridgeUnavailable(_)
                | CoreError::DeviceDisconnected(_)
                | CoreError::CommandFailed(_)
        )
    }
}

/// Settings storage errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to resolve settings directory")]
    DirectoryAccess,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

//! Error types for the droidtail CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use droidtail_core::error::SettingsError;
use droidtail_core::CoreError;
use thiserror::Error;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const BRIDGE_ERROR: i32 = 2;
    pub const DEVICE_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No ready devices found")]
    NoDevicesFound,

    #[error("Device not ready: {0}")]
    DeviceNotReady(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::BridgeUnavailable(_) => exit_codes::BRIDGE_ERROR,
                CoreError::DeviceDisconnected(_) => exit_codes::DEVICE_ERROR,
                CoreError::ClearFailed { .. } => exit_codes::DEVICE_ERROR,
                CoreError::NoDeviceSelected => exit_codes::DEVICE_ERROR,
                CoreError::CommandFailed(_) => exit_codes::GENERAL_ERROR,
                CoreError::Settings(_) => exit_codes::GENERAL_ERROR,
                CoreError::Io(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::NoDevicesFound => exit_codes::DEVICE_ERROR,
            CliError::DeviceNotReady(_) => exit_codes::DEVICE_ERROR,
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(e: SettingsError) -> Self {
        CliError::Core(CoreError::Settings(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

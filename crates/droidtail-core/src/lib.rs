//! droidtail core: log acquisition engine for an Android-style debug bridge.
//!
//! Framework-agnostic building blocks shared by the CLI (and any other
//! front end): the bridge client, the device registry, the polling session
//! controller, the line classifier, and settings storage.

pub mod bridge;
pub mod classify;
pub mod error;
pub mod registry;
pub mod session;
pub mod settings;
pub mod types;

pub use bridge::{AdbBridge, Bridge};
pub use error::{CoreError, Result};
pub use session::{LogSession, SessionPhase, Snapshot, DEFAULT_POLL_INTERVAL};
pub use settings::Settings;
pub use types::{ClassifiedLine, ConnectionStatus, Device, FilterConfig, Severity, WindowSize};

//! Shared data types: devices, severities, filter configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Connection status of a device as reported by the bridge.
///
/// Only `Ready` devices accept log commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Connected and authorized for debugging.
    Ready,
    /// Connected but not authorized on the device side.
    Unauthorized,
    /// Connected but not responding.
    Offline,
    Unknown,
}

impl From<&str> for ConnectionStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "device" => ConnectionStatus::Ready,
            "unauthorized" => ConnectionStatus::Unauthorized,
            "offline" => ConnectionStatus::Offline,
            _ => ConnectionStatus::Unknown,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Ready => "ready",
            ConnectionStatus::Unauthorized => "unauthorized",
            ConnectionStatus::Offline => "offline",
            ConnectionStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A device known to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Bridge-assigned serial, unique among connected devices.
    pub id: String,
    /// Model name when the bridge reports one (`devices -l`).
    pub model: Option<String>,
    pub status: ConnectionStatus,
}

impl Device {
    pub fn is_ready(&self) -> bool {
        self.status == ConnectionStatus::Ready
    }
}

/// Log severity, ordered from least to most severe.
///
/// Doubles as the filter floor: a floor of `Verbose` means "everything" and
/// carries no bridge-side filter token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// The `*:<LEVEL>` filterspec the bridge understands for this floor.
    ///
    /// `Verbose` is the inclusive baseline and yields no token.
    pub fn bridge_token(self) -> Option<&'static str> {
        match self {
            Severity::Verbose => None,
            Severity::Debug => Some("*:D"),
            Severity::Info => Some("*:I"),
            Severity::Warning => Some("*:W"),
            Severity::Error => Some("*:E"),
        }
    }

    /// Single-letter marker as it appears in log output.
    pub fn marker(self) -> char {
        match self {
            Severity::Verbose => 'V',
            Severity::Debug => 'D',
            Severity::Info => 'I',
            Severity::Warning => 'W',
            Severity::Error => 'E',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Verbose
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verbose" | "v" => Ok(Severity::Verbose),
            "debug" | "d" => Ok(Severity::Debug),
            "info" | "i" => Ok(Severity::Info),
            "warning" | "warn" | "w" => Ok(Severity::Warning),
            "error" | "e" => Ok(Severity::Error),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

/// Allowed line-count windows for a snapshot fetch.
pub const WINDOW_SIZES: [u32; 4] = [50, 100, 200, 500];

/// Bounded line-count window for a snapshot fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct WindowSize(u32);

impl WindowSize {
    pub fn new(lines: u32) -> Result<Self, String> {
        if WINDOW_SIZES.contains(&lines) {
            Ok(WindowSize(lines))
        } else {
            Err(format!(
                "Window must be one of {:?}, got {}",
                WINDOW_SIZES, lines
            ))
        }
    }

    pub fn lines(self) -> u32 {
        self.0
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize(100)
    }
}

impl TryFrom<u32> for WindowSize {
    type Error = String;

    fn try_from(lines: u32) -> Result<Self, Self::Error> {
        WindowSize::new(lines)
    }
}

impl From<WindowSize> for u32 {
    fn from(w: WindowSize) -> u32 {
        w.0
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable fetch parameters for a polling session.
///
/// A new value replaces the old one atomically; it is never mutated while a
/// fetch is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub floor: Severity,
    pub window: WindowSize,
}

impl FilterConfig {
    pub fn new(floor: Severity, window: WindowSize) -> Self {
        Self { floor, window }
    }
}

/// A log line with its detected severity. `None` means the classifier found
/// no level marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub raw: String,
    pub severity: Option<Severity>,
}

//! Persistent user settings.
//!
//! Explicit load-at-init / save-on-change lifecycle: consumers load once,
//! inject the value where needed, and write back through [`Settings::save`]
//! when the user changes a default. Nothing reads this ambiently.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::types::{Severity, WindowSize};

const SETTINGS_FILE: &str = "settings.json";

/// User-tunable defaults for the CLI and session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gap between scheduled fetches, in milliseconds.
    pub poll_interval_ms: u64,
    /// Default severity floor for new sessions.
    pub floor: Severity,
    /// Default line window for new sessions.
    pub window: WindowSize,
    /// Explicit bridge executable path; discovery applies when unset.
    pub adb_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            floor: Severity::Verbose,
            window: WindowSize::default(),
            adb_path: None,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Platform settings file location.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let dirs = ProjectDirs::from("", "", "droidtail")
            .ok_or(SettingsError::DirectoryAccess)?;
        Ok(dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Load from the platform location; defaults when no file exists yet.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist to the platform location, creating the directory as needed.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

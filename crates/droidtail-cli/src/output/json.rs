//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::json;

use droidtail_core::{ClassifiedLine, Device, Settings};

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_devices(&self, devices: &[Device]) -> String {
        let output = json!({
            "devices": devices,
            "count": devices.len()
        });
        Self::to_json(&output)
    }

    fn format_log(&self, lines: &[ClassifiedLine]) -> String {
        let output = json!({
            "lines": lines,
            "count": lines.len()
        });
        Self::to_json(&output)
    }

    fn format_settings(&self, settings: &Settings, path: &str) -> String {
        let output = json!({
            "path": path,
            "settings": settings
        });
        Self::to_json(&output)
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&json!({ "message": message }))
    }
}

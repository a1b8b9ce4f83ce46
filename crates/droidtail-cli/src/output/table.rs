//! Table-formatted output for CLI.

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use droidtail_core::{ClassifiedLine, ConnectionStatus, Device, Settings, Severity};

use super::OutputFormatter;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn status_cell(status: ConnectionStatus) -> Cell {
        match status {
            ConnectionStatus::Ready => Cell::new("ready").fg(Color::Green),
            ConnectionStatus::Unauthorized => Cell::new("unauthorized").fg(Color::Yellow),
            ConnectionStatus::Offline => Cell::new("offline").fg(Color::Red),
            ConnectionStatus::Unknown => Cell::new("unknown").fg(Color::DarkGrey),
        }
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_devices(&self, devices: &[Device]) -> String {
        if devices.is_empty() {
            return "No devices found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Serial", "Model", "Status"]);

        for device in devices {
            table.add_row(vec![
                Cell::new(&device.id),
                Cell::new(device.model.as_deref().unwrap_or("-")),
                Self::status_cell(device.status),
            ]);
        }

        format!("{}\n\nFound {} device(s)", table, devices.len())
    }

    fn format_log(&self, lines: &[ClassifiedLine]) -> String {
        lines
            .iter()
            .map(|line| colorize_line(line).to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_settings(&self, settings: &Settings, path: &str) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Settings file: {}", path));
        lines.push(format!("  interval:  {} ms", settings.poll_interval_ms));
        lines.push(format!("  level:     {}", settings.floor));
        lines.push(format!("  lines:     {}", settings.window));
        lines.push(format!(
            "  adb-path:  {}",
            settings
                .adb_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(auto-discover)".to_string())
        ));
        lines.join("\n")
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Color a log line by its detected severity. Unclassified lines stay plain.
pub fn colorize_line(line: &ClassifiedLine) -> ColoredString {
    match line.severity {
        Some(Severity::Error) => line.raw.red().bold(),
        Some(Severity::Warning) => line.raw.yellow(),
        Some(Severity::Info) => line.raw.green(),
        Some(Severity::Debug) => line.raw.blue(),
        Some(Severity::Verbose) => line.raw.dimmed(),
        None => line.raw.normal(),
    }
}

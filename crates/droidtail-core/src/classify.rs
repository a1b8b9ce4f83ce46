//! Severity classification for raw log lines.
//!
//! The bridge returns plain text; each line is tagged with a severity by
//! looking for a standalone level marker (`E`, `W`, `I`, `D`, `V`) bounded
//! by whitespace or the tag delimiter `/`. Covers both the `E/Tag(123):`
//! and the threadtime `... 1234 5678 E Tag:` layouts.

use crate::types::{ClassifiedLine, Severity};

/// Markers checked in priority order; the most severe match wins.
const PRIORITY: [Severity; 5] = [
    Severity::Error,
    Severity::Warning,
    Severity::Info,
    Severity::Debug,
    Severity::Verbose,
];

/// Classify a single log line. Total: every input, including the empty
/// string, yields exactly one result.
pub fn classify(line: &str) -> ClassifiedLine {
    ClassifiedLine {
        raw: line.to_string(),
        severity: detect_severity(line),
    }
}

/// Classify a full snapshot, skipping blank lines and buffer headers.
pub fn classify_snapshot(text: &str) -> Vec<ClassifiedLine> {
    text.lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--------- beginning of")
        })
        .map(classify)
        .collect()
}

fn detect_severity(line: &str) -> Option<Severity> {
    PRIORITY
        .into_iter()
        .find(|sev| has_marker(line, sev.marker()))
}

/// True when `marker` appears as a standalone token: preceded by
/// start-of-line or whitespace, followed by whitespace or `/`.
fn has_marker(line: &str, marker: char) -> bool {
    let bytes = line.as_bytes();
    for (i, ch) in line.char_indices() {
        if ch != marker {
            continue;
        }
        let before = i == 0 || matches!(bytes[i - 1], b' ' | b'\t');
        let after = matches!(bytes.get(i + 1), Some(b' ') | Some(b'\t') | Some(b'/'));
        if before && after {
            return true;
        }
    }
    false
}

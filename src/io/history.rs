//! Plain-text history files.
//!
//! One event per line:
//!
//! ```text
//! (0, 0: 1) 1.0; [0.25,0.31]
//! (0, 1: 2) 0.4; [0.1,0.2,0.15]
//! ```
//!
//! A `;` directly after the closing parenthesis is accepted on input.
//! Blank lines are ignored.

use std::path::Path;

use anyhow::Context;

use crate::error::HistoryError;
use crate::simulation::{Event, History, Scenario};

/// Render `history` in the line format, without a trailing newline.
pub fn format_history(history: &[Event]) -> String {
    history
        .iter()
        .map(Event::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_event(text: &str) -> Option<Event> {
    let rest = text.strip_prefix('(')?;
    let (head, rest) = rest.split_once(')')?;
    let (x, rest_head) = head.split_once(',')?;
    let (y, z) = rest_head.split_once(':')?;

    let rest = rest.trim_start();
    let rest = rest.strip_prefix(';').unwrap_or(rest);
    let (alpha, delta) = rest.split_once(';')?;

    let delta = delta.trim().strip_prefix('[')?.strip_suffix(']')?;
    let delta = delta
        .split(',')
        .map(|d| d.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;

    Some(Event::new(
        x.trim().parse().ok()?,
        y.trim().parse().ok()?,
        z.trim().parse().ok()?,
        alpha.trim().parse().ok()?,
        delta,
    ))
}

/// Parse a history from text.
///
/// Only the line syntax and the increment count are checked here; the
/// remaining consistency checks happen when the history is replayed.
pub fn parse_history(text: &str) -> Result<History, HistoryError> {
    let mut history = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = parse_event(line).ok_or_else(|| HistoryError::Malformed {
            line: i + 1,
            text: line.to_string(),
        })?;
        if event.delta.len() != event.z + 1 {
            return Err(HistoryError::IncrementLength {
                z: event.z,
                len: event.delta.len(),
                expected: event.z + 1,
            });
        }
        history.push(event);
    }
    Ok(history)
}

/// Write `history` to `path`.
pub fn write_history(path: &Path, history: &[Event]) -> anyhow::Result<()> {
    std::fs::write(path, format_history(history))
        .with_context(|| format!("failed to write history '{}'", path.display()))
}

/// Read a history from `path`.
pub fn load_history(path: &Path) -> anyhow::Result<History> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history '{}'", path.display()))?;
    parse_history(&text).with_context(|| format!("failed to parse history '{}'", path.display()))
}

/// Read a history from `path` and replay it, optionally only up to
/// `stop_after` items.
pub fn load_scenario(path: &Path, stop_after: Option<usize>) -> anyhow::Result<Scenario> {
    let history = load_history(path)?;
    let scenario = match stop_after {
        Some(n) => Scenario::truncated(&history, n),
        None => Scenario::from_history(history),
    };
    scenario.with_context(|| format!("invalid history in '{}'", path.display()))
}

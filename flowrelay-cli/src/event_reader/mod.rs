//! JSONL event reader
//!
//! Each non-empty input line must be a JSON object; it becomes one [`Event`].
//! Blank lines and `#` comment lines are skipped.

use anyhow::{Context, Result};
use flowrelay_core::models::Event;

/// Parse one input line. `Ok(None)` means the line carries no event.
pub fn parse_event_line(line: &str) -> Result<Option<Event>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let event = Event::from_json(trimmed).context("Failed to parse event line")?;
    Ok(Some(event))
}

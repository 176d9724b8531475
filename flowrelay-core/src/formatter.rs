//! Event to message text formatting

use crate::models::Event;
use serde_json::Value;
use std::sync::Arc;

/// Turns an event into the message body sent to the chat service.
pub type Formatter = Arc<dyn Fn(&Event) -> String + Send + Sync>;

/// Default formatter: `key: value` pairs in field order, joined with `,`.
///
/// Strings render bare and a top-level `null` renders empty. Every other
/// value is written as compact JSON.
pub fn format_event(event: &Event) -> String {
    event
        .iter()
        .map(|(key, value)| format!("{}: {}", key, render_value(value)))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn default_formatter() -> Formatter {
    Arc::new(format_event)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

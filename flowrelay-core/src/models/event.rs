//! Pipeline event data structure

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field stamped with the send time after a successful delivery.
pub const TIME_FIELD: &str = "time";

/// Field holding message tags passed through to the transport.
pub const TAGS_FIELD: &str = "tags";

/// An open, insertion-ordered mapping of field name to value.
///
/// No field is required. `tags`, when it is an array of strings, is forwarded
/// to the chat service alongside the formatted content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    /// Create an empty event
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an event from a JSON object. Non-object JSON is rejected.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Builder-style insert, keeps insertion order
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Tags carried by the event. Non-string entries are skipped; a `tags`
    /// field that is not an array yields `None`.
    pub fn tags(&self) -> Option<Vec<String>> {
        match self.fields.get(TAGS_FIELD)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Stamp the send time (RFC 3339, UTC)
    pub fn stamp_time(&mut self, at: DateTime<Utc>) {
        self.insert(
            TIME_FIELD,
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_json_preserves_order() {
        let event = Event::from_json(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        let keys: Vec<&str> = event.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Event::from_json("[1,2]").is_err());
        assert!(Event::from_json("\"text\"").is_err());
    }

    #[test]
    fn test_tags_extraction() {
        let event = Event::new().with("tags", serde_json::json!(["cpu", 3, "alert"]));
        assert_eq!(
            event.tags(),
            Some(vec!["cpu".to_string(), "alert".to_string()])
        );

        let event = Event::new().with("tags", "not-a-list");
        assert_eq!(event.tags(), None);

        assert_eq!(Event::new().tags(), None);
    }

    #[test]
    fn test_stamp_time_appends_field() {
        let mut event = Event::new().with("msg", "hi");
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        event.stamp_time(at);
        assert_eq!(
            event.get(TIME_FIELD).and_then(|v| v.as_str()),
            Some("2024-05-01T12:00:00.000Z")
        );
        assert_eq!(event.len(), 2);
    }
}

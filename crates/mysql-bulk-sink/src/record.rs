//! Host-delivered record and chunk types
//!
//! The buffering framework in front of this sink owns chunking and flush
//! scheduling; it hands over one [`Chunk`] per flush. Records are opaque
//! JSON objects and are read-only here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single buffered log event with its original event time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Event timestamp as assigned by the source
    pub timestamp: DateTime<Utc>,

    /// Field name to value mapping
    pub record: serde_json::Map<String, serde_json::Value>,
}

impl LogEvent {
    /// Create an event from a JSON value; non-object values become an
    /// empty record (every key lookup then yields NULL downstream).
    pub fn new(timestamp: DateTime<Utc>, data: serde_json::Value) -> Self {
        let record = match data {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self { timestamp, record }
    }

    /// Look up a field by name
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.record.get(key)
    }
}

/// One batch of buffered events delivered by the host for a single flush.
///
/// Consumed entirely by one write; the sink never retains a chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chunk {
    /// Routing tag the host buffered these events under
    pub tag: String,

    /// Ordered events, oldest first
    pub events: Vec<LogEvent>,
}

impl Chunk {
    /// Create an empty chunk for the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            events: Vec::new(),
        }
    }

    /// Append an event (builder-style)
    pub fn with_event(mut self, timestamp: DateTime<Utc>, data: serde_json::Value) -> Self {
        self.events.push(LogEvent::new(timestamp, data));
        self
    }

    /// Number of events in this chunk
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether this chunk carries no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_field_lookup() {
        let ts = Utc.timestamp_opt(1_000_000_000, 0).unwrap();
        let event = LogEvent::new(ts, serde_json::json!({"msg": "hello", "level": 3}));

        assert_eq!(event.get("msg"), Some(&serde_json::json!("hello")));
        assert_eq!(event.get("level"), Some(&serde_json::json!(3)));
        assert_eq!(event.get("absent"), None);
    }

    #[test]
    fn test_non_object_data_becomes_empty_record() {
        let ts = Utc.timestamp_opt(1_000_000_000, 0).unwrap();
        let event = LogEvent::new(ts, serde_json::json!("scalar"));
        assert!(event.record.is_empty());
    }

    #[test]
    fn test_chunk_builder_preserves_order() {
        let ts = Utc.timestamp_opt(1_000_000_000, 0).unwrap();
        let chunk = Chunk::new("app.access")
            .with_event(ts, serde_json::json!({"seq": 1}))
            .with_event(ts, serde_json::json!({"seq": 2}));

        assert_eq!(chunk.tag, "app.access");
        assert_eq!(chunk.len(), 2);
        assert!(!chunk.is_empty());
        assert_eq!(chunk.events[0].get("seq"), Some(&serde_json::json!(1)));
        assert_eq!(chunk.events[1].get("seq"), Some(&serde_json::json!(2)));
    }
}

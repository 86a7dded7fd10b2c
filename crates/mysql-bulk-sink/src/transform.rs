//! Record transformer
//!
//! Turns one log event into one ordered tuple of driver values, following
//! the key mapping compiled from configuration and the column lengths
//! loaded at startup. Transformation never fails: a missing key binds NULL
//! and an over-long value is truncated to the column's capacity.
//!
//! Truncation happens before JSON encoding, not after. Encoding after
//! truncation keeps the ordering contract of the destination schema, even
//! though a short limit can yield a clipped payload.

use chrono::{DateTime, Utc};

use crate::config::KeySpec;
use crate::error::{Error, Result};
use crate::record::LogEvent;
use crate::schema::ColumnSpec;

/// Render format for `${time}` columns
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
struct ColumnBinding {
    source_key: String,
    is_time_placeholder: bool,
    json_encoded: bool,
    max_length: Option<usize>,
}

/// Binds log events to value tuples, one per column in order.
///
/// Built once at startup from the key mapping and the column specs;
/// read-only afterwards, so concurrent flushes can share it freely.
#[derive(Debug, Clone)]
pub struct RowBinder {
    bindings: Vec<ColumnBinding>,
}

impl RowBinder {
    /// Zip the key mapping with the loaded column specs.
    ///
    /// Both sequences derive from the configured column list, so a length
    /// mismatch means the plan was assembled wrong.
    pub fn new(keys: &[KeySpec], specs: &[ColumnSpec]) -> Result<Self> {
        if keys.len() != specs.len() {
            return Err(Error::config(format!(
                "key mapping has {} entries for {} columns",
                keys.len(),
                specs.len()
            )));
        }
        let bindings = keys
            .iter()
            .zip(specs)
            .map(|(key, spec)| ColumnBinding {
                source_key: key.source_key.clone(),
                is_time_placeholder: key.is_time_placeholder,
                json_encoded: key.json_encoded,
                max_length: spec.max_length,
            })
            .collect();
        Ok(Self { bindings })
    }

    /// Number of values per tuple
    pub fn width(&self) -> usize {
        self.bindings.len()
    }

    /// Transform one event into a bound tuple, in column order.
    pub fn bind(&self, event: &LogEvent) -> Vec<mysql_async::Value> {
        self.bindings
            .iter()
            .map(|binding| binding.bind(event))
            .collect()
    }
}

impl ColumnBinding {
    fn bind(&self, event: &LogEvent) -> mysql_async::Value {
        if self.is_time_placeholder {
            return format_time(&event.timestamp).into();
        }

        let raw = event
            .get(&self.source_key)
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        let clipped = match self.max_length {
            Some(max) => truncate_value(raw, max),
            None => raw,
        };

        if self.json_encoded {
            // A missing key therefore binds the string "null", matching the
            // table contract for JSON-encoded columns.
            return clipped.to_string().into();
        }

        json_to_mysql(clipped)
    }
}

fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIME_FORMAT).to_string()
}

/// Clip a value to the column capacity: strings by character count,
/// arrays by element count. Everything else passes through.
fn truncate_value(value: serde_json::Value, max: usize) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => {
            if s.chars().count() <= max {
                serde_json::Value::String(s)
            } else {
                serde_json::Value::String(s.chars().take(max).collect())
            }
        }
        serde_json::Value::Array(mut items) => {
            items.truncate(max);
            serde_json::Value::Array(items)
        }
        other => other,
    }
}

/// Convert a JSON value to a driver value for parameter binding.
fn json_to_mysql(value: serde_json::Value) -> mysql_async::Value {
    match value {
        serde_json::Value::Null => mysql_async::Value::NULL,
        serde_json::Value::Bool(b) => b.into(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(u) = n.as_u64() {
                u.into()
            } else {
                n.as_f64().unwrap_or_default().into()
            }
        }
        serde_json::Value::String(s) => s.into(),
        composite => composite.to_string().into(),
    }
}

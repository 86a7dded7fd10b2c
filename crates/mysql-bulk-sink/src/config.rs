//! Sink configuration
//!
//! Flat key/value configuration for the bulk sink. Everything the
//! statement builder needs that does not depend on record content is
//! computed once by [`MysqlBulkConfig::compile`] and frozen into an
//! [`InsertPlan`]: the ordered column list, the key mapping and the
//! `ON DUPLICATE KEY UPDATE` clause. Configuration errors surface here,
//! before any connection is opened.

use std::collections::HashSet;

use schemars::JsonSchema;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::connection::ConnectionSettings;
use crate::error::{Error, Result};

/// Key name that renders as the formatted event timestamp instead of a
/// record field.
pub const TIME_PLACEHOLDER: &str = "${time}";

/// A string that must not leak into logs or config dumps.
///
/// Debug, Display and Serialize all redact; `expose_secret` hands out the
/// actual value for authentication.
#[derive(Clone)]
pub struct SensitiveString(SecretString);

impl SensitiveString {
    /// Wrap a sensitive value
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::new(value.into().into_boxed_str()))
    }

    /// Expose the wrapped value
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SensitiveString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for SensitiveString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<&str> for SensitiveString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for SensitiveString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("***REDACTED***")
    }
}

impl<'de> Deserialize<'de> for SensitiveString {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl JsonSchema for SensitiveString {
    fn schema_name() -> String {
        "SensitiveString".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut schema = gen.subschema_for::<String>();
        if let schemars::schema::Schema::Object(obj) = &mut schema {
            obj.format = Some("password".to_string());
        }
        schema
    }
}

/// MySQL bulk sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct MysqlBulkConfig {
    /// Database host; unset defers to the driver default (localhost)
    #[serde(default)]
    pub host: Option<String>,

    /// Database port; unset defers to the driver default (3306)
    #[serde(default)]
    pub port: Option<u16>,

    /// Database name
    #[validate(length(min = 1))]
    pub database: String,

    /// Database user
    #[serde(default)]
    pub username: Option<String>,

    /// Database password
    #[serde(default)]
    pub password: Option<SensitiveString>,

    /// MySQL option file read for client defaults
    #[serde(default)]
    pub default_file: Option<String>,

    /// Option file group; `client` when unset
    #[serde(default)]
    pub default_group: Option<String>,

    /// Path of a file with trusted SSL CA certificates
    #[serde(default)]
    pub sslca: Option<String>,

    /// Path of a directory with trusted SSL CA certificates
    #[serde(default)]
    pub sslcapath: Option<String>,

    /// Verify the server certificate
    #[serde(default)]
    pub sslverify: Option<bool>,

    /// Permitted cipher list; the TLS backend negotiates its own, so this
    /// is accepted only for config parity and logged when set
    #[serde(default)]
    pub sslcipher: Option<String>,

    /// Target table
    #[validate(length(min = 1))]
    pub table: String,

    /// Comma-separated target columns, in insert order
    #[validate(length(min = 1))]
    pub column_names: String,

    /// Comma-separated record keys, one per column; defaults to
    /// `column_names`. The literal `${time}` renders the event timestamp.
    #[serde(default)]
    pub key_names: Option<String>,

    /// Comma-separated subset of keys whose values are stored as JSON text
    #[serde(default)]
    pub json_key_names: Option<String>,

    /// Emit an `ON DUPLICATE KEY UPDATE` clause
    #[serde(default)]
    pub on_duplicate_key_update: bool,

    /// Comma-separated columns updated on duplicate key
    #[serde(default)]
    pub on_duplicate_update_keys: Option<String>,
}

/// One entry of the key mapping, aligned 1:1 with the column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    /// Record key to read, or the raw placeholder text
    pub source_key: String,
    /// Render the event timestamp instead of a record field
    pub is_time_placeholder: bool,
    /// Serialize the value to JSON text before binding
    pub json_encoded: bool,
}

/// Immutable insert plan compiled from the configuration.
///
/// Built once at startup and shared read-only across every write; nothing
/// in it depends on record content.
#[derive(Debug, Clone)]
pub struct InsertPlan {
    /// Target table
    pub table: String,
    /// Ordered column list
    pub columns: Vec<String>,
    /// Key mapping, same length and order as `columns`
    pub keys: Vec<KeySpec>,
    /// Precomputed `ON DUPLICATE KEY UPDATE` clause
    pub duplicate_clause: Option<String>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl MysqlBulkConfig {
    /// Validate the configuration and compile the insert plan.
    ///
    /// Every fatal configuration error is raised here, before the schema
    /// load or any connection attempt.
    pub fn compile(&self) -> Result<InsertPlan> {
        self.validate()
            .map_err(|e| Error::config(format!("invalid sink configuration: {e}")))?;

        let columns = split_list(&self.column_names);
        if columns.is_empty() {
            return Err(Error::config("column_names must name at least one column"));
        }

        let key_names = match &self.key_names {
            Some(raw) => split_list(raw),
            None => columns.clone(),
        };
        if key_names.len() != columns.len() {
            return Err(Error::config(format!(
                "key_names has {} entries but column_names has {}",
                key_names.len(),
                columns.len()
            )));
        }

        let json_keys: HashSet<String> = self
            .json_key_names
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
            .into_iter()
            .collect();

        let duplicate_clause = if self.on_duplicate_key_update {
            let update_keys = self
                .on_duplicate_update_keys
                .as_deref()
                .map(split_list)
                .unwrap_or_default();
            if update_keys.is_empty() {
                return Err(Error::config(
                    "on_duplicate_key_update is enabled but on_duplicate_update_keys is empty",
                ));
            }
            let updates: Vec<String> = update_keys
                .iter()
                .map(|col| format!("`{col}` = VALUES(`{col}`)"))
                .collect();
            Some(format!("ON DUPLICATE KEY UPDATE {}", updates.join(",")))
        } else {
            None
        };

        let keys = key_names
            .into_iter()
            .map(|key| KeySpec {
                is_time_placeholder: key == TIME_PLACEHOLDER,
                json_encoded: json_keys.contains(&key),
                source_key: key,
            })
            .collect();

        Ok(InsertPlan {
            table: self.table.clone(),
            columns,
            keys,
            duplicate_clause,
        })
    }

    /// Extract the declarative connection settings
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host.clone(),
            port: self.port,
            database: Some(self.database.clone()),
            username: self.username.clone(),
            password: self.password.as_ref().map(|p| p.expose_secret().to_string()),
            default_file: self.default_file.clone(),
            default_group: self.default_group.clone(),
            sslca: self.sslca.clone(),
            sslcapath: self.sslcapath.clone(),
            sslverify: self.sslverify,
            sslcipher: self.sslcipher.clone(),
        }
    }
}

//! # mysql-bulk-sink
//!
//! Bulk-loading MySQL sink for buffered log pipelines.
//!
//! Each buffered chunk of log records becomes a single multi-row
//! `INSERT INTO ... VALUES (...),(...)` statement, executed over one
//! short-lived connection. Values are bound as positional parameters,
//! truncated to the destination column widths discovered at startup.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mysql_bulk_sink::prelude::*;
//!
//! let config: MysqlBulkConfig = serde_json::from_str(r#"{
//!     "host": "db.example.com",
//!     "database": "logs",
//!     "username": "writer",
//!     "password": "secret",
//!     "table": "access",
//!     "column_names": "created_at,host,path,code",
//!     "key_names": "${time},host,path,code"
//! }"#)?;
//!
//! let sink = MysqlBulkSink::start(config).await?;
//! let rows = sink.write(&chunk).await?;
//! ```
//!
//! ## Behavior notes
//!
//! - `${time}` in `key_names` renders the event timestamp as
//!   `%Y-%m-%d %H:%M:%S`.
//! - Keys listed in `json_key_names` are serialized to JSON text after
//!   truncation.
//! - A failed write surfaces whole-chunk; retry policy belongs to the
//!   host buffer.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod error;
pub mod record;
pub mod schema;
pub mod sink;
pub mod statement;
pub mod transform;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Configuration
    pub use crate::config::{InsertPlan, KeySpec, MysqlBulkConfig, SensitiveString};

    // Records and chunks
    pub use crate::record::{Chunk, LogEvent};

    // Connection provider
    pub use crate::connection::{ConnectionSettings, MysqlConnector};

    // Schema metadata
    pub use crate::schema::ColumnSpec;

    // Transformation and statement assembly
    pub use crate::statement::{build_bulk_insert, InsertStatement};
    pub use crate::transform::RowBinder;

    // Sink
    pub use crate::sink::{ChunkSink, MysqlBulkSink};
}

// Re-export commonly used items at crate root
pub use config::MysqlBulkConfig;
pub use error::{Error, Result};
pub use record::Chunk;
pub use sink::{ChunkSink, MysqlBulkSink};

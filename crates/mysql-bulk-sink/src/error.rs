//! Error types for mysql-bulk-sink
//!
//! The sink distinguishes failures that must abort startup (bad
//! configuration, unreadable table schema) from failures that surface to the
//! host per flush (connectivity, statement execution). Per-record
//! transformation issues are never errors; they degrade to NULL or to an
//! unbounded column with a warning.

use std::fmt;
use thiserror::Error;

/// Result type for mysql-bulk-sink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed or incomplete sink configuration
    Configuration,
    /// Table metadata could not be loaded at startup
    Schema,
    /// Connection establishment or teardown failed
    Connection,
    /// Statement execution failed
    Execution,
}

impl ErrorCategory {
    /// Whether errors in this category abort startup rather than a single
    /// flush. The host owns retry for everything else.
    #[inline]
    pub const fn is_startup_fatal(self) -> bool {
        matches!(self, Self::Configuration | Self::Schema)
    }
}

/// Main error type for mysql-bulk-sink
#[derive(Error, Debug)]
pub enum Error {
    /// Sink configuration is invalid
    #[error("configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration
        message: String,
    },

    /// Table metadata query failed at startup
    #[error("schema error: {message}")]
    Schema {
        /// What failed while introspecting the table
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection could not be established or closed
    #[error("connection error: {message}")]
    Connection {
        /// What failed while talking to the server
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Bulk statement execution failed
    #[error("execution error: {message}")]
    Execution {
        /// What the server reported
        message: String,
        /// The statement that failed, when known
        sql: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Execution { .. } => ErrorCategory::Execution,
        }
    }

    /// Whether this error aborts startup
    #[inline]
    pub fn is_startup_fatal(&self) -> bool {
        self.category().is_startup_fatal()
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            source: None,
        }
    }

    /// Create a schema error with source
    pub fn schema_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Schema {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql: None,
            source: None,
        }
    }

    /// Create an execution error carrying the failed statement
    pub fn execution_with_sql(
        message: impl Into<String>,
        sql: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Execution {
            message: message.into(),
            sql: Some(sql.into()),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Schema => write!(f, "schema"),
            Self::Connection => write!(f, "connection"),
            Self::Execution => write!(f, "execution"),
        }
    }
}

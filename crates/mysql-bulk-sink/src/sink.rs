//! Bulk writer
//!
//! Orchestrates one flush: acquire a connection, transform the chunk,
//! build the bulk insert, execute, release the connection, report the row
//! count. All shared state is frozen by [`MysqlBulkSink::start`], so the
//! host may flush different chunks concurrently against one sink instance.
//!
//! Execution failures propagate whole-chunk to the host uncaught; retry,
//! backoff and dead-lettering are the host's responsibility.

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use tracing::{debug, info};

use crate::config::MysqlBulkConfig;
use crate::connection::MysqlConnector;
use crate::error::{Error, Result};
use crate::record::Chunk;
use crate::schema::load_column_specs;
use crate::statement::{build_bulk_insert, InsertStatement};
use crate::transform::RowBinder;

/// The seam the host flush framework drives: one call per buffered chunk.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// Write one chunk, returning the number of rows written.
    async fn write(&self, chunk: &Chunk) -> Result<u64>;
}

/// Bulk-loading MySQL sink.
///
/// `start` performs the fail-fast part of the lifecycle: configuration
/// compilation, connector construction and the one-time schema load.
/// Everything it stores is read-only afterwards.
pub struct MysqlBulkSink {
    table: String,
    columns: Vec<String>,
    duplicate_clause: Option<String>,
    binder: RowBinder,
    connector: MysqlConnector,
}

impl MysqlBulkSink {
    /// Validate configuration, load column metadata and freeze the plan.
    ///
    /// Configuration errors surface before any connection is opened; a
    /// failing metadata query (unknown table, no permission) aborts startup.
    pub async fn start(config: MysqlBulkConfig) -> Result<Self> {
        let plan = config.compile()?;
        let connector = MysqlConnector::new(&config.connection_settings())?;

        let mut conn = connector.connect().await?;
        let specs = load_column_specs(&mut conn, &plan.table, &plan.columns).await;
        let _ = conn.disconnect().await;
        let specs = specs?;

        let binder = RowBinder::new(&plan.keys, &specs)?;
        info!(
            table = %plan.table,
            columns = plan.columns.len(),
            on_duplicate_key_update = plan.duplicate_clause.is_some(),
            "mysql bulk sink started"
        );

        Ok(Self {
            table: plan.table,
            columns: plan.columns,
            duplicate_clause: plan.duplicate_clause,
            binder,
            connector,
        })
    }

    /// Connectivity probe for host-side health checks.
    pub async fn check(&self) -> Result<()> {
        let mut conn = self.connector.connect().await?;
        let probe = conn.query_drop("SELECT 1").await;
        let _ = conn.disconnect().await;
        probe.map_err(|e| Error::connection_with_source("connectivity probe failed", e))
    }

    /// Transform a chunk into one executable statement, `None` when empty.
    fn assemble(&self, chunk: &Chunk) -> Option<InsertStatement> {
        if chunk.is_empty() {
            return None;
        }
        let tuples: Vec<Vec<mysql_async::Value>> = chunk
            .events
            .iter()
            .map(|event| self.binder.bind(event))
            .collect();
        Some(build_bulk_insert(
            &self.table,
            &self.columns,
            tuples,
            self.duplicate_clause.as_deref(),
        ))
    }
}

#[async_trait]
impl ChunkSink for MysqlBulkSink {
    async fn write(&self, chunk: &Chunk) -> Result<u64> {
        let Some(statement) = self.assemble(chunk) else {
            debug!(tag = %chunk.tag, "empty chunk, nothing to write");
            return Ok(0);
        };
        let InsertStatement { sql, params } = statement;
        debug!(
            tag = %chunk.tag,
            records = chunk.len(),
            params = params.len(),
            "executing bulk insert"
        );

        let mut conn = self.connector.connect().await?;
        let outcome = conn.exec_drop(sql.as_str(), params).await;
        let rows = conn.affected_rows();
        // Release the connection on every exit path, including failure.
        let _ = conn.disconnect().await;

        match outcome {
            Ok(()) => {
                info!(table = %self.table, tag = %chunk.tag, rows, "bulk insert complete");
                Ok(rows)
            }
            Err(e) => Err(Error::execution_with_sql(
                format!("bulk insert of {} records failed", chunk.len()),
                sql,
                e,
            )),
        }
    }
}

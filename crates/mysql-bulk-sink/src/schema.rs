//! Schema cache
//!
//! One `SHOW COLUMNS` query at startup yields the maximum string length for
//! every configured column. Bounded character types (`char(n)`,
//! `varchar(n)`) produce a limit; any other type, a column missing from the
//! table, or an unparseable type string degrades to "no truncation". Only
//! the metadata query itself failing is fatal.

use std::collections::HashMap;
use std::sync::OnceLock;

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Column metadata needed by the record transformer.
///
/// Ordered 1:1 with the configured column list; immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name as configured
    pub name: String,
    /// Maximum character length, for bounded character types only
    pub max_length: Option<usize>,
}

fn char_length_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(char|varchar)\((\d+)\)").unwrap())
}

/// Extract `n` from a `char(n)`/`varchar(n)` type declaration.
pub fn parse_char_length(type_decl: &str) -> Option<usize> {
    char_length_re()
        .captures(type_decl)
        .and_then(|caps| caps.get(2))
        .and_then(|len| len.as_str().parse().ok())
}

fn specs_from_types(
    table: &str,
    columns: &[String],
    types: &HashMap<String, String>,
) -> Vec<ColumnSpec> {
    columns
        .iter()
        .map(|name| {
            let max_length = match types.get(name) {
                Some(type_decl) => {
                    let len = parse_char_length(type_decl);
                    if len.is_none() {
                        debug!(table, column = %name, r#type = %type_decl, "column binds unbounded");
                    }
                    len
                }
                None => {
                    warn!(table, column = %name, "configured column not found in table; values bind unbounded");
                    None
                }
            };
            ColumnSpec {
                name: name.clone(),
                max_length,
            }
        })
        .collect()
}

/// Load column specs for the configured columns, in configured order.
///
/// Issued once at startup; the result is held for the sink's lifetime.
pub async fn load_column_specs(
    conn: &mut Conn,
    table: &str,
    columns: &[String],
) -> Result<Vec<ColumnSpec>> {
    let sql = format!("SHOW COLUMNS FROM `{table}`");
    let rows: Vec<Row> = conn
        .query(sql)
        .await
        .map_err(|e| Error::schema_with_source(format!("cannot load columns of table {table}"), e))?;

    let mut types: HashMap<String, String> = HashMap::with_capacity(rows.len());
    for row in rows {
        if let (Some(field), Some(type_decl)) =
            (row.get::<String, _>("Field"), row.get::<String, _>("Type"))
        {
            types.insert(field, type_decl);
        }
    }

    Ok(specs_from_types(table, columns, &types))
}

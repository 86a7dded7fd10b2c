//! Statement builder
//!
//! Assembles the whole chunk into a single multi-row `INSERT`, so one
//! round-trip carries every record of the flush. Values travel as
//! positional parameters for driver-side binding; user data is never
//! spliced into the SQL text.

/// A fully assembled bulk insert, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Statement text with `?` placeholders
    pub sql: String,
    /// Positional parameters, all tuples flattened in chunk order
    pub params: Vec<mysql_async::Value>,
}

/// One row's placeholder pattern: `(?,?,…)` with one `?` per column.
pub fn row_template(width: usize) -> String {
    let placeholders = vec!["?"; width].join(",");
    format!("({placeholders})")
}

/// Build the bulk insert for one chunk.
///
/// `tuples` must all have `columns.len()` values; the transformer
/// guarantees this by construction. The duplicate-key clause is computed
/// once at configure time and appended verbatim.
pub fn build_bulk_insert(
    table: &str,
    columns: &[String],
    tuples: Vec<Vec<mysql_async::Value>>,
    duplicate_clause: Option<&str>,
) -> InsertStatement {
    let quoted: Vec<String> = columns.iter().map(|c| format!("`{c}`")).collect();
    let rows = vec![row_template(columns.len()); tuples.len()].join(",");

    let mut sql = format!(
        "INSERT INTO `{table}` ({columns}) VALUES {rows}",
        columns = quoted.join(",")
    );
    if let Some(clause) = duplicate_clause {
        sql.push(' ');
        sql.push_str(clause);
    }

    let params = tuples.into_iter().flatten().collect();
    InsertStatement { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(values: &[&str]) -> Vec<mysql_async::Value> {
        values.iter().map(|v| (*v).into()).collect()
    }

    #[test]
    fn test_row_template() {
        assert_eq!(row_template(1), "(?)");
        assert_eq!(row_template(3), "(?,?,?)");
    }

    #[test]
    fn test_single_tuple_insert() {
        let stmt = build_bulk_insert(
            "access",
            &["id".to_string(), "msg".to_string()],
            vec![tuple(&["1", "hello"])],
            None,
        );

        assert_eq!(stmt.sql, "INSERT INTO `access` (`id`,`msg`) VALUES (?,?)");
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_one_tuple_per_record_with_duplicate_clause() {
        let stmt = build_bulk_insert(
            "t",
            &["a".to_string(), "b".to_string()],
            vec![tuple(&["1", "x"]), tuple(&["2", "y"])],
            Some("ON DUPLICATE KEY UPDATE `a` = VALUES(`a`)"),
        );

        assert_eq!(
            stmt.sql,
            "INSERT INTO `t` (`a`,`b`) VALUES (?,?),(?,?) ON DUPLICATE KEY UPDATE `a` = VALUES(`a`)"
        );
        assert_eq!(stmt.params, tuple(&["1", "x", "2", "y"]));
    }

    #[test]
    fn test_placeholder_count_matches_chunk_shape() {
        let columns: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let tuples: Vec<Vec<mysql_async::Value>> =
            (0..5).map(|i| vec![i.into(), i.into(), i.into()]).collect();

        let stmt = build_bulk_insert("t", &columns, tuples, None);
        let placeholders = stmt.sql.matches('?').count();
        assert_eq!(placeholders, 5 * columns.len());
        assert_eq!(stmt.params.len(), placeholders);
    }
}

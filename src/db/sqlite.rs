//! SQLite driver implementation using rusqlite

use crate::db::driver::{DatabaseBackend, DatabaseDriver};
use crate::db::query::{CellValue, Row, RowQuery};
use crate::db::schema::ColumnDef;
use anyhow::{Context, Result};
use rusqlite::{types::ValueRef, Connection, OpenFlags};
use std::path::PathBuf;
use tracing::debug;

/// SQLite driver
pub struct SqliteDriver {
    conn: Connection,
    pub path: PathBuf,
}

impl SqliteDriver {
    /// Open an existing SQLite database file read-only
    pub fn open(path: PathBuf) -> Result<Self> {
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;

        Ok(Self { conn, path })
    }

    /// Wrap an already open connection (in-memory databases, tests)
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            path: PathBuf::from(":memory:"),
        }
    }
}

impl DatabaseDriver for SqliteDriver {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    fn database_name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "sqlite".to_string())
    }

    fn get_columns(&self, table: &str) -> Result<Vec<ColumnDef>> {
        let (schema, table) = match table.split_once('.') {
            Some((schema, table)) => (schema, table),
            None => ("main", table),
        };
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?1, ?2) ORDER BY cid")?;
        let mut columns = Vec::new();
        let mut rows = stmt.query([table, schema])?;
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let data_type: String = row.get(1)?;
            columns.push(ColumnDef { name, data_type });
        }
        Ok(columns)
    }

    fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<Row>> {
        let sql = query.to_sql(self.backend());
        debug!(%sql, "fetching rows");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("Failed to prepare `{}`", sql))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

        let mut out = Vec::new();
        let mut raw_rows = stmt.query([])?;
        while let Some(row) = raw_rows.next()? {
            let mut cells = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let val = match row.get_ref(i)? {
                    ValueRef::Null => CellValue::Null,
                    ValueRef::Integer(v) => CellValue::Int(v),
                    ValueRef::Real(v) => CellValue::Float(v),
                    ValueRef::Text(v) => CellValue::String(String::from_utf8_lossy(v).to_string()),
                    ValueRef::Blob(v) => CellValue::Binary(v.to_vec()),
                };
                cells.push((name.clone(), val));
            }
            out.push(Row::new(cells));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RowOrder;

    fn driver() -> SqliteDriver {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE colors (
                 id INTEGER PRIMARY KEY, label VARCHAR(20), hex TEXT, active BOOLEAN
             );
             INSERT INTO colors VALUES (2, 'green', '#00ff00', 1);
             INSERT INTO colors VALUES (1, 'red', '#ff0000', 1);
             INSERT INTO colors VALUES (3, 'blue', NULL, 0);",
        )
        .unwrap();
        SqliteDriver::from_connection(conn)
    }

    #[test]
    fn test_columns_in_declared_order() {
        let columns = driver().get_columns("colors").unwrap();
        assert_eq!(
            columns,
            vec![
                ColumnDef::new("id", "INTEGER"),
                ColumnDef::new("label", "VARCHAR(20)"),
                ColumnDef::new("hex", "TEXT"),
                ColumnDef::new("active", "BOOLEAN"),
            ]
        );
    }

    #[test]
    fn test_missing_table_has_no_columns() {
        assert!(driver().get_columns("nope").unwrap().is_empty());
        assert_eq!(driver().get_columns("main.colors").unwrap().len(), 4);
    }

    #[test]
    fn test_fetch_rows_filtered_and_ordered() {
        let query = RowQuery {
            table: "colors".to_string(),
            filter: Some("active = 1".to_string()),
            order: Some(RowOrder::Column("id".to_string())),
        };
        let rows = driver().fetch_rows(&query).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("label"), Some(&CellValue::String("red".to_string())));
        assert_eq!(rows[1].get("id"), Some(&CellValue::Int(2)));
    }

    #[test]
    fn test_fetch_rows_keeps_nulls() {
        let query = RowQuery {
            table: "colors".to_string(),
            filter: Some("id = 3".to_string()),
            order: None,
        };
        let rows = driver().fetch_rows(&query).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].get("hex").unwrap().is_null());
    }

    #[test]
    fn test_fetch_rows_bad_filter_is_error() {
        let mut query = RowQuery::new("colors");
        query.filter = Some("no_such_column = 1".to_string());
        assert!(driver().fetch_rows(&query).is_err());
    }
}

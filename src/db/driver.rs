//! Database driver abstraction trait
//!
//! Defines the interface that all database backends must implement.

use crate::db::{is_string_type, ColumnDef, Row, RowQuery};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Which database backend is in use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseBackend {
    SqlServer,
    Sqlite,
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseBackend::SqlServer => write!(f, "SQL Server"),
            DatabaseBackend::Sqlite => write!(f, "SQLite"),
        }
    }
}

/// Which `CellValue` variant a backend decodes values of a column into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Bool,
    Int,
    Float,
    String,
    DateTime,
    Binary,
}

impl DatabaseBackend {
    /// Cell variant the driver yields for non-NULL values of a declared type.
    ///
    /// Must agree with `fetch_rows`: SQLite decodes by storage class following
    /// column affinity, SQL Server by TDS value type.
    pub fn cell_kind(self, sql_type: &str) -> CellKind {
        let upper = sql_type.trim().to_uppercase();
        match self {
            DatabaseBackend::Sqlite => sqlite_cell_kind(&upper),
            DatabaseBackend::SqlServer => sqlserver_cell_kind(&upper),
        }
    }
}

// Affinity rules, with string-like types first so that inference and
// rendering agree on which columns hold text.
fn sqlite_cell_kind(upper: &str) -> CellKind {
    if is_string_type(upper) {
        CellKind::String
    } else if upper.contains("INT") {
        CellKind::Int
    } else if upper.is_empty() || upper.contains("BLOB") {
        CellKind::Binary
    } else if ["REAL", "FLOA", "DOUB"].iter().any(|t| upper.contains(t)) {
        CellKind::Float
    } else {
        // NUMERIC affinity (BOOLEAN, DECIMAL, DATE, ...) stores integral values as integers
        CellKind::Int
    }
}

fn sqlserver_cell_kind(upper: &str) -> CellKind {
    let base = upper.split('(').next().unwrap_or(upper).trim();
    match base {
        "BIT" => CellKind::Bool,
        "TINYINT" | "SMALLINT" | "INT" | "BIGINT" => CellKind::Int,
        "REAL" | "FLOAT" | "MONEY" | "SMALLMONEY" => CellKind::Float,
        "DATE" | "TIME" | "DATETIME" | "DATETIME2" | "SMALLDATETIME" | "DATETIMEOFFSET" => {
            CellKind::DateTime
        }
        "BINARY" | "VARBINARY" | "IMAGE" | "TIMESTAMP" | "ROWVERSION" => CellKind::Binary,
        // DECIMAL and NUMERIC are decoded to their exact text
        _ => CellKind::String,
    }
}

/// Trait that all database drivers must implement.
///
/// Generation runs once per build on one connection, so every call blocks the
/// calling thread. Drivers over async clients drive them to completion
/// internally.
pub trait DatabaseDriver {
    /// Which backend this driver represents
    fn backend(&self) -> DatabaseBackend;

    /// Get the name of the current database / file
    fn database_name(&self) -> String;

    /// Get column definitions for a table, in ordinal order.
    ///
    /// A table that does not exist yields an empty list.
    fn get_columns(&self, table: &str) -> Result<Vec<ColumnDef>>;

    /// Fetch every row matching the query, in result order
    fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<Row>>;
}

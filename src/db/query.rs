//! Shared query types used by all database drivers

use crate::db::driver::DatabaseBackend;

/// Represents a cell value in a fetched row
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(String),
    Binary(Vec<u8>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Bool(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::String(v) => write!(f, "{}", v),
            CellValue::DateTime(v) => write!(f, "{}", v),
            CellValue::Binary(v) => write!(f, "0x{}", hex::encode(v)),
        }
    }
}

/// One fetched row: column name to value, in select order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new(cells: Vec<(String, CellValue)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// How fetched rows are ordered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowOrder {
    /// A single column, quoted for the target dialect
    Column(String),
    /// A raw `ORDER BY` fragment taken from configuration
    Expression(String),
}

/// A `SELECT *` over one table with an optional filter and ordering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowQuery {
    pub table: String,
    pub filter: Option<String>,
    pub order: Option<RowOrder>,
}

impl RowQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            order: None,
        }
    }

    /// Render the query for the given dialect
    pub fn to_sql(&self, backend: DatabaseBackend) -> String {
        let mut sql = format!("SELECT * FROM {}", quote_table(backend, &self.table));
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(filter.trim());
        }
        match &self.order {
            Some(RowOrder::Column(column)) => {
                sql.push_str(" ORDER BY ");
                sql.push_str(&quote_ident(backend, column));
            }
            Some(RowOrder::Expression(expr)) if !expr.trim().is_empty() => {
                sql.push_str(" ORDER BY ");
                sql.push_str(expr.trim());
            }
            _ => {}
        }
        sql
    }
}

/// Quote a single identifier for the dialect
pub fn quote_ident(backend: DatabaseBackend, ident: &str) -> String {
    match backend {
        DatabaseBackend::Sqlite => format!("\"{}\"", ident.replace('"', "\"\"")),
        DatabaseBackend::SqlServer => format!("[{}]", ident.replace(']', "]]")),
    }
}

/// Quote a possibly schema-qualified table name (`schema.table`)
pub fn quote_table(backend: DatabaseBackend, table: &str) -> String {
    table
        .split('.')
        .map(|part| quote_ident(backend, part))
        .collect::<Vec<_>>()
        .join(".")
}

// Helper for hex encoding binary data
mod hex {
    pub fn encode(data: &[u8]) -> String {
        data.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_select() {
        let query = RowQuery::new("colors");
        assert_eq!(query.to_sql(DatabaseBackend::Sqlite), "SELECT * FROM \"colors\"");
        assert_eq!(query.to_sql(DatabaseBackend::SqlServer), "SELECT * FROM [colors]");
    }

    #[test]
    fn test_filter_and_column_order() {
        let query = RowQuery {
            table: "dbo.colors".to_string(),
            filter: Some(" active = 1 ".to_string()),
            order: Some(RowOrder::Column("id".to_string())),
        };
        assert_eq!(
            query.to_sql(DatabaseBackend::SqlServer),
            "SELECT * FROM [dbo].[colors] WHERE active = 1 ORDER BY [id]"
        );
    }

    #[test]
    fn test_expression_order_is_not_quoted() {
        let query = RowQuery {
            table: "colors".to_string(),
            filter: Some("  ".to_string()),
            order: Some(RowOrder::Expression("label DESC".to_string())),
        };
        assert_eq!(
            query.to_sql(DatabaseBackend::Sqlite),
            "SELECT * FROM \"colors\" ORDER BY label DESC"
        );
    }

    #[test]
    fn test_quote_escapes_delimiters() {
        assert_eq!(quote_ident(DatabaseBackend::Sqlite, "we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_ident(DatabaseBackend::SqlServer, "we]ird"), "[we]]ird]");
    }

    #[test]
    fn test_row_lookup() {
        let row = Row::new(vec![
            ("id".to_string(), CellValue::Int(1)),
            ("name".to_string(), CellValue::String("red".to_string())),
        ]);
        assert_eq!(row.get("id"), Some(&CellValue::Int(1)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get("name").map(|v| v.to_string()).as_deref(), Some("red"));
    }
}

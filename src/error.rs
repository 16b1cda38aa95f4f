//! Failures that abort a generation run

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("No columns found for enum {0}.")]
    NoColumnsFound(String),

    #[error("Enum {0} must have at least one column with String representation (for enum name).")]
    NoStringColumnFound(String),

    #[error("Column {column} configured for enum {enum_name} does not exist in table {table}.")]
    UnknownColumn {
        enum_name: String,
        column: String,
        table: String,
    },

    #[error("Table {table} returned no rows for enum {enum_name}.")]
    EmptyEnum { enum_name: String, table: String },

    #[error("Failed to render enum {enum_name}: {source:#}")]
    Render {
        enum_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Database error for enum {enum_name}: {source:#}")]
    Database {
        enum_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write enum {enum_name} to {}: {source}", .path.display())]
    Write {
        enum_name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load template: {0:#}")]
    Template(anyhow::Error),

    #[error("Failed to connect: {0:#}")]
    Connection(anyhow::Error),
}

impl GenerateError {
    /// Name of the enum the failure belongs to, if any
    pub fn enum_name(&self) -> Option<&str> {
        match self {
            GenerateError::NoColumnsFound(name) | GenerateError::NoStringColumnFound(name) => {
                Some(name)
            }
            GenerateError::UnknownColumn { enum_name, .. }
            | GenerateError::EmptyEnum { enum_name, .. }
            | GenerateError::Render { enum_name, .. }
            | GenerateError::Database { enum_name, .. }
            | GenerateError::Write { enum_name, .. } => Some(enum_name),
            GenerateError::Template(_) | GenerateError::Connection(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;

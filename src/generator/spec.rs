//! Enum definitions before and after column inference

use crate::db::{RowOrder, RowQuery};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One configured enum, possibly missing its id and name columns
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumSpec {
    /// Name of the generated type
    pub name: String,
    /// Source table, optionally `schema.table`
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_column: Option<String>,
    /// Raw SQL `WHERE` condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Raw SQL `ORDER BY` expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

impl EnumSpec {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    pub fn with_name_column(mut self, column: impl Into<String>) -> Self {
        self.name_column = Some(column.into());
        self
    }

    /// Required fields are present and the name can become a Rust type
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Enum name must not be empty (table {:?})", self.table);
        }
        if self.table.trim().is_empty() {
            bail!("Enum {} has no table", self.name);
        }
        if syn::parse_str::<syn::Ident>(&self.name).is_err() {
            bail!("Enum name {:?} is not a valid Rust identifier", self.name);
        }
        Ok(())
    }
}

/// An enum whose id and name columns are both known
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CompletedEnumSpec {
    pub name: String,
    pub table: String,
    pub id_column: String,
    /// Declared type of the id column
    pub id_sql_type: String,
    pub name_column: String,
    pub filter: Option<String>,
    pub order_by: Option<String>,
}

impl CompletedEnumSpec {
    /// Rows for this enum, ordered by `order_by` or else by the id column
    pub fn row_query(&self) -> RowQuery {
        let order = match self.order_by.as_deref().map(str::trim) {
            Some(expr) if !expr.is_empty() => RowOrder::Expression(expr.to_string()),
            _ => RowOrder::Column(self.id_column.clone()),
        };
        RowQuery {
            table: self.table.clone(),
            filter: self.filter.clone(),
            order: Some(order),
        }
    }
}

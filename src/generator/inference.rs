//! Column inference
//!
//! Fills in the id and name columns an enum definition left out, using the
//! columns the database reports for its table.

use crate::db::ColumnCatalog;
use crate::error::{GenerateError, Result};
use crate::generator::spec::{CompletedEnumSpec, EnumSpec};

/// Complete `spec` from `catalog`.
///
/// The name column is the explicit one if given, the only column of a
/// single-column table, or else the first string-like column. The id column
/// defaults to the resolved name column. Explicit columns are trusted to
/// exist; the orchestrator checks that before calling in.
pub fn complete(spec: &EnumSpec, catalog: &ColumnCatalog) -> Result<CompletedEnumSpec> {
    if catalog.is_empty() {
        return Err(GenerateError::NoColumnsFound(spec.name.clone()));
    }

    let name_column = match &spec.name_column {
        Some(explicit) => explicit.clone(),
        None => catalog
            .sole_column()
            .or_else(|| catalog.first_string_like())
            .map(|column| column.name.clone())
            .ok_or_else(|| GenerateError::NoStringColumnFound(spec.name.clone()))?,
    };

    let id_column = spec
        .id_column
        .clone()
        .unwrap_or_else(|| name_column.clone());

    let id_sql_type = catalog
        .get(&id_column)
        .map(|column| column.data_type.clone())
        .unwrap_or_default();

    Ok(CompletedEnumSpec {
        name: spec.name.clone(),
        table: spec.table.clone(),
        id_column,
        id_sql_type,
        name_column,
        filter: spec.filter.clone(),
        order_by: spec.order_by.clone(),
    })
}

//! Shared schema types used by all database drivers

/// Column definition as reported by the database
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Whether the declared type holds text.
    ///
    /// Follows SQLite's text affinity rule: any type name containing
    /// `CHAR`, `CLOB` or `TEXT` is textual.
    pub fn is_string_like(&self) -> bool {
        is_string_type(&self.data_type)
    }
}

/// Classify a database type name as textual or not
pub fn is_string_type(data_type: &str) -> bool {
    let upper = data_type.trim().to_uppercase();
    upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") || upper == "STRING"
}

/// Columns of one table, in the order the database reported them.
///
/// Built once per table and never modified afterwards.
#[derive(Clone, Debug, Default)]
pub struct ColumnCatalog {
    columns: Vec<ColumnDef>,
}

impl ColumnCatalog {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by its exact (case-sensitive) name
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First textual column in catalog order
    pub fn first_string_like(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.is_string_like())
    }

    /// The only column of a single-column table
    pub fn sole_column(&self) -> Option<&ColumnDef> {
        match self.columns.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter()
    }
}

impl FromIterator<ColumnDef> for ColumnCatalog {
    fn from_iter<I: IntoIterator<Item = ColumnDef>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_like_types() {
        let string_like = [
            "VARCHAR",
            "varchar(255)",
            "NVARCHAR",
            "CHAR(2)",
            "TEXT",
            "ntext",
            "CLOB",
            "CHARACTER VARYING",
            "STRING",
        ];
        for ty in string_like {
            assert!(is_string_type(ty), "{ty} should be string-like");
        }
        for ty in ["INTEGER", "BIGINT", "REAL", "BOOLEAN", "DATE", "BLOB", "NUMERIC(10,2)", ""] {
            assert!(!is_string_type(ty), "{ty} should not be string-like");
        }
    }

    #[test]
    fn test_catalog_preserves_order() {
        let catalog: ColumnCatalog = [
            ColumnDef::new("id", "INTEGER"),
            ColumnDef::new("code", "VARCHAR"),
            ColumnDef::new("label", "TEXT"),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = catalog.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "code", "label"]);
        assert_eq!(catalog.first_string_like().map(|c| c.name.as_str()), Some("code"));
        assert_eq!(catalog.len(), 3);
        assert!(catalog.sole_column().is_none());
    }

    #[test]
    fn test_catalog_lookup_is_case_sensitive() {
        let catalog = ColumnCatalog::new(vec![ColumnDef::new("Name", "VARCHAR")]);
        assert!(catalog.contains("Name"));
        assert!(!catalog.contains("name"));
        assert_eq!(catalog.sole_column().map(|c| c.name.as_str()), Some("Name"));
    }
}

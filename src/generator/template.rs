//! Templates that turn a completed enum and its rows into source text

use crate::db::{CellKind, CellValue, DatabaseBackend, Row};
use crate::generator::spec::CompletedEnumSpec;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use convert_case::{Case, Casing};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const TOOL_NAME: &str = "sqlenumgen";

/// Timestamp layout embedded in generated files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Values injected into every rendered file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationMeta {
    pub tool_version: String,
    pub generated_at: String,
    /// Backend the rows were read from
    pub backend: DatabaseBackend,
}

impl GenerationMeta {
    pub fn now(backend: DatabaseBackend) -> Self {
        Self::at(backend, Utc::now())
    }

    pub fn at(backend: DatabaseBackend, time: DateTime<Utc>) -> Self {
        Self {
            tool_version: crate::TOOL_VERSION.to_string(),
            generated_at: time.format(TIMESTAMP_FORMAT).to_string(),
            backend,
        }
    }
}

/// Renders one enum into source text
pub trait TemplateRenderer {
    /// Name the template is registered under
    fn name(&self) -> &str;

    fn render(
        &self,
        spec: &CompletedEnumSpec,
        rows: &[Row],
        meta: &GenerationMeta,
    ) -> Result<String>;
}

/// Registry of built-in templates
pub struct TemplateEngine;

impl TemplateEngine {
    pub const AVAILABLE: &'static [&'static str] = &[RustEnumTemplate::NAME];

    /// Look up a template by name.
    ///
    /// An unknown name means the tool was configured or packaged wrongly, so
    /// the error is not tied to any enum.
    pub fn load(name: &str) -> Result<Box<dyn TemplateRenderer>> {
        match name {
            RustEnumTemplate::NAME => Ok(Box::new(RustEnumTemplate)),
            _ => bail!(
                "template {:?} not found (available: {})",
                name,
                Self::AVAILABLE.join(", ")
            ),
        }
    }
}

/// Rust `enum` with id/name lookups, one variant per row
pub struct RustEnumTemplate;

impl RustEnumTemplate {
    pub const NAME: &'static str = "rust_enum";
}

impl TemplateRenderer for RustEnumTemplate {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(
        &self,
        spec: &CompletedEnumSpec,
        rows: &[Row],
        meta: &GenerationMeta,
    ) -> Result<String> {
        let entries = collect_entries(spec, rows)?;
        let id_kind = IdKind::of(&entries, meta.backend.cell_kind(&spec.id_sql_type))?;

        let tokens = enum_tokens(spec, &entries, id_kind)?;

        let mut out = String::new();
        out.push_str(&format!(
            "// @generated by {} version \"{}\" on date \"{}\"\n",
            TOOL_NAME, meta.tool_version, meta.generated_at
        ));
        out.push_str(&format!(
            "// Source table `{}` (id: `{}`, name: `{}`). Do not edit.\n\n",
            spec.table, spec.id_column, spec.name_column
        ));
        out.push_str(&tokens.to_string());
        out.push('\n');
        Ok(out)
    }
}

// One variant of the generated enum
struct Entry {
    ident: Ident,
    label: String,
    id: IdValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum IdValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl IdValue {
    fn from_cell(cell: &CellValue) -> Result<Self> {
        match cell {
            CellValue::Int(v) => Ok(IdValue::Int(*v)),
            CellValue::Bool(v) => Ok(IdValue::Bool(*v)),
            CellValue::String(v) | CellValue::DateTime(v) => Ok(IdValue::Str(v.clone())),
            CellValue::Null => bail!("id is NULL"),
            CellValue::Float(v) => bail!("id {} is a floating point number", v),
            CellValue::Binary(_) => bail!("id is binary data"),
        }
    }

    fn kind(&self) -> IdKind {
        match self {
            IdValue::Int(_) => IdKind::Int,
            IdValue::Bool(_) => IdKind::Bool,
            IdValue::Str(_) => IdKind::Str,
        }
    }

    fn tokens(&self) -> TokenStream {
        match self {
            IdValue::Int(v) => quote!(#v),
            IdValue::Bool(v) => quote!(#v),
            IdValue::Str(v) => {
                let v = v.as_str();
                quote!(#v)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IdKind {
    Int,
    Bool,
    Str,
}

impl IdKind {
    /// Kind shared by every id, or the one the declared column decodes to
    /// when there are none
    fn of(entries: &[Entry], declared: CellKind) -> Result<Self> {
        let mut kinds = entries.iter().map(|e| e.id.kind());
        let Some(first) = kinds.next() else {
            return Self::from_cell_kind(declared);
        };
        if let Some(other) = kinds.find(|k| *k != first) {
            bail!("id column mixes {:?} and {:?} values", first, other);
        }
        Ok(first)
    }

    fn from_cell_kind(kind: CellKind) -> Result<Self> {
        match kind {
            CellKind::Int => Ok(IdKind::Int),
            CellKind::Bool => Ok(IdKind::Bool),
            CellKind::String | CellKind::DateTime => Ok(IdKind::Str),
            CellKind::Float => bail!("id column holds floating point numbers"),
            CellKind::Binary => bail!("id column holds binary data"),
        }
    }

    fn return_type(self) -> TokenStream {
        match self {
            IdKind::Int => quote!(i64),
            IdKind::Bool => quote!(bool),
            IdKind::Str => quote!(&'static str),
        }
    }

    fn param_type(self) -> TokenStream {
        match self {
            IdKind::Str => quote!(&str),
            other => other.return_type(),
        }
    }
}

fn collect_entries(spec: &CompletedEnumSpec, rows: &[Row]) -> Result<Vec<Entry>> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut idents = HashSet::new();
    let mut ids = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let name_cell = row
            .get(&spec.name_column)
            .ok_or_else(|| anyhow!("row {} has no column {}", index + 1, spec.name_column))?;
        if name_cell.is_null() {
            bail!("row {} has a NULL name in column {}", index + 1, spec.name_column);
        }
        let label = name_cell.to_string();
        let ident = variant_ident(&label)?;

        let id_cell = row
            .get(&spec.id_column)
            .ok_or_else(|| anyhow!("row {} has no column {}", index + 1, spec.id_column))?;
        let id = IdValue::from_cell(id_cell)
            .with_context(|| format!("row {} ({:?})", index + 1, label))?;

        if !idents.insert(ident.to_string()) {
            bail!("name {:?} maps to variant {} more than once", label, ident);
        }
        if !ids.insert(id.clone()) {
            bail!("id {} of {:?} is not unique", id_cell, label);
        }

        entries.push(Entry { ident, label, id });
    }
    Ok(entries)
}

/// PascalCase identifier for a row label
pub fn variant_ident(label: &str) -> Result<Ident> {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators = SEPARATORS
        .get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("separator pattern is valid"));

    let words = separators.replace_all(label, " ");
    let mut ident = words.trim().to_case(Case::Pascal);
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    syn::parse_str::<Ident>(&ident)
        .map_err(|_| anyhow!("name {:?} does not map to a Rust identifier", label))
}

fn enum_tokens(
    spec: &CompletedEnumSpec,
    entries: &[Entry],
    id_kind: IdKind,
) -> Result<TokenStream> {
    let enum_ident = syn::parse_str::<Ident>(&spec.name)
        .map_err(|_| anyhow!("{:?} is not a valid type name", spec.name))?;

    let idents: Vec<&Ident> = entries.iter().map(|e| &e.ident).collect();
    let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
    let ids: Vec<TokenStream> = entries.iter().map(|e| e.id.tokens()).collect();
    let count = entries.len();

    let id_type = id_kind.return_type();
    let id_param = id_kind.param_type();
    let type_doc = format!(" Rows of table `{}`.", spec.table);
    let variant_docs: Vec<String> = labels.iter().map(|label| format!(" {}", label)).collect();

    Ok(quote! {
        #[doc = #type_doc]
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum #enum_ident {
            #(
                #[doc = #variant_docs]
                #idents,
            )*
        }

        impl #enum_ident {
            /// Every value, in table order.
            pub const ALL: [#enum_ident; #count] = [#(#enum_ident::#idents,)*];

            /// Value of the id column.
            pub const fn id(self) -> #id_type {
                match self {
                    #(#enum_ident::#idents => #ids,)*
                }
            }

            /// Value of the name column.
            pub const fn name(self) -> &'static str {
                match self {
                    #(#enum_ident::#idents => #labels,)*
                }
            }

            #[allow(unreachable_patterns)]
            pub fn from_id(id: #id_param) -> ::core::option::Option<Self> {
                match id {
                    #(#ids => ::core::option::Option::Some(#enum_ident::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            pub fn from_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #(#labels => ::core::option::Option::Some(#enum_ident::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::core::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.name())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn spec() -> CompletedEnumSpec {
        CompletedEnumSpec {
            name: "Color".to_string(),
            table: "colors".to_string(),
            id_column: "id".to_string(),
            id_sql_type: "INTEGER".to_string(),
            name_column: "label".to_string(),
            filter: None,
            order_by: None,
        }
    }

    fn row(id: CellValue, label: CellValue) -> Row {
        Row::new(vec![("id".to_string(), id), ("label".to_string(), label)])
    }

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    fn meta() -> GenerationMeta {
        GenerationMeta::at(
            DatabaseBackend::Sqlite,
            Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap(),
        )
    }

    fn render(spec: &CompletedEnumSpec, rows: &[Row]) -> Result<String> {
        RustEnumTemplate.render(spec, rows, &meta())
    }

    fn compact(source: &str) -> String {
        source.split_whitespace().collect()
    }

    #[test]
    fn test_meta_timestamp_format() {
        let meta = meta();
        assert_eq!(meta.generated_at, "2024-03-05T07:08:09.000Z");
        assert_eq!(meta.tool_version, crate::TOOL_VERSION);
    }

    #[test]
    fn test_render_integer_ids() {
        let rows = [
            row(CellValue::Int(1), text("red")),
            row(CellValue::Int(2), text("light blue")),
        ];
        let source = render(&spec(), &rows).unwrap();

        assert!(source.starts_with(&format!(
            "// @generated by sqlenumgen version \"{}\" on date \"2024-03-05T07:08:09.000Z\"\n",
            crate::TOOL_VERSION
        )));
        assert!(source.contains("pub enum Color"));
        assert!(source.contains("Red"));
        assert!(source.contains("LightBlue"));
        assert!(source.contains("\"light blue\""));
        assert!(source.contains("1i64"));
        assert!(compact(&source).contains("fnid(self)->i64"));
        syn::parse_file(&source).expect("generated source parses");
    }

    #[test]
    fn test_render_string_ids_escapes_labels() {
        let mut spec = spec();
        spec.id_column = "label".to_string();
        let rows = [row(CellValue::Int(1), text("say \"hi\""))];
        let source = render(&spec, &rows).unwrap();
        assert!(source.contains("SayHi"));
        assert!(source.contains(r#""say \"hi\"""#));
        assert!(compact(&source).contains("fnid(self)->&'staticstr"));
        syn::parse_file(&source).expect("generated source parses");
    }

    #[test]
    fn test_render_empty_enum_uses_column_type() {
        let mut spec = spec();
        spec.id_sql_type = "VARCHAR(10)".to_string();
        let source = render(&spec, &[]).unwrap();
        assert!(source.contains("0usize"));
        assert!(compact(&source).contains("fnfrom_id(id:&str)"));
        syn::parse_file(&source).expect("generated source parses");
    }

    #[test]
    fn test_empty_enum_id_type_matches_decoded_rows() {
        let mut spec = spec();
        spec.id_sql_type = "BOOLEAN".to_string();
        let empty = render(&spec, &[]).unwrap();
        assert!(compact(&empty).contains("fnid(self)->i64"));
        let filled = render(&spec, &[row(CellValue::Int(1), text("yes"))]).unwrap();
        assert!(compact(&filled).contains("fnid(self)->i64"));

        spec.id_sql_type = "DECIMAL".to_string();
        let mssql = GenerationMeta::at(DatabaseBackend::SqlServer, Utc::now());
        let empty = RustEnumTemplate.render(&spec, &[], &mssql).unwrap();
        assert!(compact(&empty).contains("fnid(self)->&'staticstr"));

        spec.id_sql_type = "FLOAT".to_string();
        let err = RustEnumTemplate.render(&spec, &[], &mssql).unwrap_err();
        assert!(err.to_string().contains("floating point"));
    }

    #[test]
    fn test_variant_idents() {
        assert_eq!(variant_ident("red").unwrap().to_string(), "Red");
        assert_eq!(variant_ident("HTTP_NOT_FOUND").unwrap().to_string(), "HttpNotFound");
        assert!(variant_ident("2xl").unwrap().to_string().starts_with("_2"));
        assert_eq!(variant_ident(" extra - large ").unwrap().to_string(), "ExtraLarge");
        assert!(variant_ident("!!!").is_err());
        assert!(variant_ident("").is_err());
    }

    #[test]
    fn test_duplicate_variant_rejected() {
        let rows = [
            row(CellValue::Int(1), text("dark-red")),
            row(CellValue::Int(2), text("dark red")),
        ];
        let err = render(&spec(), &rows).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let rows = [row(CellValue::Int(1), text("red")), row(CellValue::Int(1), text("green"))];
        let err = render(&spec(), &rows).unwrap_err();
        assert!(err.to_string().contains("not unique"));
    }

    #[test]
    fn test_null_name_rejected() {
        let rows = [row(CellValue::Int(1), CellValue::Null)];
        let err = render(&spec(), &rows).unwrap_err();
        assert!(err.to_string().contains("NULL name"));
    }

    #[test]
    fn test_bad_ids_rejected() {
        let mixed = [row(CellValue::Int(1), text("red")), row(text("g"), text("green"))];
        assert!(render(&spec(), &mixed).unwrap_err().to_string().contains("mixes"));

        let float = [row(CellValue::Float(1.5), text("red"))];
        let err = render(&spec(), &float).unwrap_err();
        assert!(format!("{err:#}").contains("floating point"));
    }

    #[test]
    fn test_load_templates() {
        let template = TemplateEngine::load("rust_enum").unwrap();
        assert_eq!(template.name(), RustEnumTemplate::NAME);

        let err = TemplateEngine::load("velocity").err().unwrap();
        assert!(err.to_string().contains("not found"));
    }
}

//! Main generation driver
//!
//! Runs every configured enum through catalog lookup, inference, row fetch,
//! rendering and writing, strictly in configured order. The first failure
//! ends the run; files already written for earlier enums stay on disk.

use crate::config::GeneratorSettings;
use crate::db::{ColumnCatalog, DatabaseDriver};
use crate::error::{GenerateError, Result};
use crate::generator::inference;
use crate::generator::spec::{CompletedEnumSpec, EnumSpec};
use crate::generator::template::{GenerationMeta, TemplateEngine, TemplateRenderer};
use crate::generator::writer::{ArtifactWriter, GeneratedArtifact};
use tracing::{debug, info};

/// Generates one artifact per configured enum
pub struct Generator<'a> {
    driver: &'a dyn DatabaseDriver,
    template: Box<dyn TemplateRenderer>,
    writer: &'a dyn ArtifactWriter,
    settings: &'a GeneratorSettings,
}

impl<'a> Generator<'a> {
    /// Create a generator using the template named in `settings`
    pub fn new(
        driver: &'a dyn DatabaseDriver,
        writer: &'a dyn ArtifactWriter,
        settings: &'a GeneratorSettings,
    ) -> Result<Self> {
        let template = TemplateEngine::load(&settings.template).map_err(GenerateError::Template)?;
        Ok(Self::with_template(driver, template, writer, settings))
    }

    /// Create a generator with an already loaded template
    pub fn with_template(
        driver: &'a dyn DatabaseDriver,
        template: Box<dyn TemplateRenderer>,
        writer: &'a dyn ArtifactWriter,
        settings: &'a GeneratorSettings,
    ) -> Self {
        Self {
            driver,
            template,
            writer,
            settings,
        }
    }

    /// Generate every enum, stopping at the first failure
    pub fn generate(&self, enums: &[EnumSpec]) -> Result<Vec<GeneratedArtifact>> {
        info!(
            count = enums.len(),
            template = self.template.name(),
            "generating enums"
        );

        let mut artifacts = Vec::with_capacity(enums.len());
        for spec in enums {
            artifacts.push(self.generate_one(spec)?);
        }
        Ok(artifacts)
    }

    /// Look up the table's columns and infer the missing ones
    pub fn complete(&self, spec: &EnumSpec) -> Result<CompletedEnumSpec> {
        let columns = self
            .driver
            .get_columns(&spec.table)
            .map_err(|source| GenerateError::Database {
                enum_name: spec.name.clone(),
                source,
            })?;
        let catalog = ColumnCatalog::new(columns);
        debug!(enum_name = %spec.name, columns = catalog.len(), "read column catalog");

        if !catalog.is_empty() {
            check_explicit_columns(spec, &catalog)?;
        }
        let completed = inference::complete(spec, &catalog)?;
        debug!(
            enum_name = %completed.name,
            id_column = %completed.id_column,
            name_column = %completed.name_column,
            "columns resolved"
        );
        Ok(completed)
    }

    fn generate_one(&self, spec: &EnumSpec) -> Result<GeneratedArtifact> {
        info!(enum_name = %spec.name, table = %spec.table, "generating enum");

        let completed = self.complete(spec)?;

        let rows = self
            .driver
            .fetch_rows(&completed.row_query())
            .map_err(|source| GenerateError::Database {
                enum_name: spec.name.clone(),
                source,
            })?;
        if rows.is_empty() && !self.settings.allow_empty {
            return Err(GenerateError::EmptyEnum {
                enum_name: spec.name.clone(),
                table: spec.table.clone(),
            });
        }

        let meta = GenerationMeta::now(self.driver.backend());
        let source_text = self
            .template
            .render(&completed, &rows, &meta)
            .map_err(|source| GenerateError::Render {
                enum_name: spec.name.clone(),
                source,
            })?;

        let output_path = self.settings.output_path(&completed.name);
        self.writer
            .write(&output_path, &source_text)
            .map_err(|source| GenerateError::Write {
                enum_name: spec.name.clone(),
                path: output_path.clone(),
                source,
            })?;

        info!(
            enum_name = %completed.name,
            rows = rows.len(),
            path = %output_path.display(),
            "wrote enum"
        );
        Ok(GeneratedArtifact {
            enum_name: completed.name,
            source_text,
            output_path,
        })
    }
}

// Explicit columns must name real columns before inference trusts them.
fn check_explicit_columns(spec: &EnumSpec, catalog: &ColumnCatalog) -> Result<()> {
    for column in [&spec.id_column, &spec.name_column].into_iter().flatten() {
        if !catalog.contains(column) {
            return Err(GenerateError::UnknownColumn {
                enum_name: spec.name.clone(),
                column: column.clone(),
                table: spec.table.clone(),
            });
        }
    }
    Ok(())
}

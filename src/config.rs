//! Configuration management for sqlenumgen
//!
//! Handles loading the generator configuration from a TOML (or JSON) file.

use crate::db::sqlserver::SqlServerConfig;
use crate::generator::EnumSpec;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "sqlenumgen.toml";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "generated";
pub const DEFAULT_PACKAGE: &str = "enums";
pub const DEFAULT_TEMPLATE: &str = "rust_enum";
pub const DEFAULT_EXTENSION: &str = "rs";

/// Where the lookup tables live
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ConnectionConfig {
    Sqlite { path: PathBuf },
    SqlServer(SqlServerConfig),
}

/// Output location of generated files
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TargetConfig {
    pub directory: PathBuf,
    /// Dot- or `::`-separated package, mapped to nested directories
    pub package: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            package: DEFAULT_PACKAGE.to_string(),
        }
    }
}

impl TargetConfig {
    /// Directory the package maps to
    pub fn package_dir(&self) -> PathBuf {
        let mut dir = self.directory.clone();
        for segment in self
            .package
            .split("::")
            .flat_map(|part| part.split('.'))
            .filter(|s| !s.trim().is_empty())
        {
            dir.push(segment.trim());
        }
        dir
    }
}

/// Global generator settings
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GeneratorSettings {
    pub target: TargetConfig,
    /// Name of the built-in template to render with
    pub template: String,
    /// Accept tables that return no rows
    pub allow_empty: bool,
    /// File extension of generated files
    pub extension: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            template: DEFAULT_TEMPLATE.to_string(),
            allow_empty: false,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl GeneratorSettings {
    /// `<directory>/<package-as-path>/<EnumName>.<ext>`
    pub fn output_path(&self, enum_name: &str) -> PathBuf {
        self.target
            .package_dir()
            .join(format!("{}.{}", enum_name, self.extension))
    }
}

/// Complete generator configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub generator: GeneratorSettings,
    /// Enums to generate, in generation order
    #[serde(default, rename = "enum")]
    pub enums: Vec<EnumSpec>,
}

impl Config {
    /// Load and validate a configuration file.
    ///
    /// Relative paths inside the file resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&contents)?
        } else {
            Self::from_toml(&contents)?
        };

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config file")
    }

    /// Make relative paths relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if let ConnectionConfig::Sqlite { path } = &mut self.connection {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        let directory = &mut self.generator.target.directory;
        if directory.is_relative() {
            *directory = base.join(&*directory);
        }
    }

    /// Check everything the generator assumes about its input
    pub fn validate(&self) -> Result<()> {
        if self.generator.extension.trim().is_empty() {
            bail!("generator.extension must not be empty");
        }

        let mut seen = HashSet::new();
        for spec in &self.enums {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                bail!("Enum {} is configured more than once", spec.name);
            }
        }
        Ok(())
    }
}

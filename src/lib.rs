//! sqlenumgen - Library
//! Generates Rust enums from database lookup tables at build time
//!
//! Typical use from a build script:
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     println!("cargo:rerun-if-changed=sqlenumgen.toml");
//!     sql_enumgen::run_config_file("sqlenumgen.toml")?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod generator;

pub use config::Config;
pub use error::{GenerateError, Result};
pub use generator::{EnumSpec, GeneratedArtifact, Generator};

use generator::{ArtifactWriter, FileSystemWriter, TemplateEngine};
use std::path::Path;

/// Version embedded in every generated file
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generate every configured enum and write it to disk
pub fn run(config: &Config) -> Result<Vec<GeneratedArtifact>> {
    run_with_writer(config, &FileSystemWriter)
}

/// Generate every configured enum through `writer`.
///
/// The template and the connection are acquired once and shared by all enums.
pub fn run_with_writer(
    config: &Config,
    writer: &dyn ArtifactWriter,
) -> Result<Vec<GeneratedArtifact>> {
    let template =
        TemplateEngine::load(&config.generator.template).map_err(GenerateError::Template)?;
    let driver = db::connect(&config.connection).map_err(GenerateError::Connection)?;

    Generator::with_template(driver.as_ref(), template, writer, &config.generator)
        .generate(&config.enums)
}

/// Load a configuration file and run it
pub fn run_config_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<GeneratedArtifact>> {
    let config = Config::load(path.as_ref())?;
    Ok(run(&config)?)
}

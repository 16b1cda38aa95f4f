//! Persisting generated artifacts

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// A rendered enum and where it went
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub enum_name: String,
    pub source_text: String,
    pub output_path: PathBuf,
}

/// Stores rendered text at a path, replacing what was there
pub trait ArtifactWriter {
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;
}

/// Writes to the local filesystem, creating parent directories
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSystemWriter;

impl ArtifactWriter for FileSystemWriter {
    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)
    }
}

/// Only logs what would have been written
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunWriter;

impl ArtifactWriter for DryRunWriter {
    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        info!(path = %path.display(), bytes = text.len(), "dry run, not writing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_directories_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("model").join("enums").join("Color.rs");

        FileSystemWriter.write(&path, "first").unwrap();
        FileSystemWriter.write(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_dry_run_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Color.rs");
        DryRunWriter.write(&path, "text").unwrap();
        assert!(!path.exists());
    }
}

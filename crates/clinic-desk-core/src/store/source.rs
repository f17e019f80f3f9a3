//! Where CSV text comes from.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// CSV source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can hand over a complete CSV document.
pub trait CsvSource {
    fn read_to_string(&self) -> Result<String, SourceError>;
}

/// CSV file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CsvSource for FileSource {
    fn read_to_string(&self) -> Result<String, SourceError> {
        std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// CSV text already fetched by the caller.
#[derive(Debug, Clone)]
pub struct InlineSource(pub String);

impl CsvSource for InlineSource {
    fn read_to_string(&self) -> Result<String, SourceError> {
        Ok(self.0.clone())
    }
}

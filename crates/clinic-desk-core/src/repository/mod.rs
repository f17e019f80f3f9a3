//! In-memory collections backing the desk tables.
//!
//! Each collection is an owned value; nothing is global, so independent
//! desks (and tests) never share state. Every mutation is a single `&mut self`
//! call that either applies fully or not at all.

mod catalog;
mod records;

pub use catalog::*;
pub use records::*;

use thiserror::Error;

use crate::csv::{Decoded, DegradedRow, SkippedRow};

/// Repository errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// What a load did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records now held
    pub loaded: usize,
    /// Rows dropped while decoding
    pub skipped: Vec<SkippedRow>,
    /// Rows kept with substituted values
    pub degraded: Vec<DegradedRow>,
    /// True when the bundled defaults were used instead of the source
    pub used_defaults: bool,
}

impl LoadSummary {
    fn from_decoded<R>(decoded: &Decoded<R>) -> Self {
        Self {
            loaded: decoded.records.len(),
            skipped: decoded.skipped.clone(),
            degraded: decoded.degraded.clone(),
            used_defaults: false,
        }
    }
}

//! Desk configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::invoice::{CLINIC_UTC_OFFSET_SECS, DEFAULT_COUNTER_KEY};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTC offset out of range: {0} seconds")]
    InvalidOffset(i32),

    #[error("Empty value for {0}")]
    Empty(&'static str),
}

/// Front-desk settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeskConfig {
    /// Clinic time zone as seconds east of UTC (UTC+7 by default)
    pub utc_offset_seconds: i32,

    /// Store key of the invoice counter
    pub counter_key: String,

    /// Services CSV loaded at startup
    pub services_csv: Option<PathBuf>,

    /// Patient records CSV loaded at startup
    pub patients_csv: Option<PathBuf>,

    /// File name stem for service exports
    pub services_export_name: String,

    /// File name stem for patient exports
    pub patients_export_name: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            utc_offset_seconds: CLINIC_UTC_OFFSET_SECS,
            counter_key: DEFAULT_COUNTER_KEY.to_string(),
            services_csv: None,
            patients_csv: None,
            services_export_name: "danh-sach-dich-vu".to_string(),
            patients_export_name: "danh-sach-benh-nhan".to_string(),
        }
    }
}

impl DeskConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded desk config");
        Self::from_json_str(&json)
    }

    /// Check field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.utc_offset()?;
        if self.counter_key.trim().is_empty() {
            return Err(ConfigError::Empty("counter_key"));
        }
        if self.services_export_name.trim().is_empty() {
            return Err(ConfigError::Empty("services_export_name"));
        }
        if self.patients_export_name.trim().is_empty() {
            return Err(ConfigError::Empty("patients_export_name"));
        }
        Ok(())
    }

    /// Clinic time zone.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_seconds)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_seconds))
    }
}

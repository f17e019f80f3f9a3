//! Invoice counter state.

use serde::{Deserialize, Serialize};

/// Daily invoice counter as persisted in the key-value store.
///
/// Serialized as `{"date":"YYYY-MM-DD","counter":N}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceCounter {
    /// Calendar day (clinic time) this counter belongs to
    pub date: String,
    /// Number of invoices issued on `date`
    pub counter: u32,
}

impl InvoiceCounter {
    /// A fresh counter for the given day.
    pub fn zero(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            counter: 0,
        }
    }

    /// Parse a stored payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

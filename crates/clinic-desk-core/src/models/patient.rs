//! Patient visit models.

use serde::{Deserialize, Serialize};

use super::service::Service;

/// Contact details captured at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
}

impl PatientInfo {
    /// Create patient info without notes.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
            notes: None,
        }
    }
}

/// One saved patient visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRecord {
    /// Record ID (`record-<epoch ms>` for visits registered at the desk)
    pub id: String,
    /// Patient contact details
    pub patient_info: PatientInfo,
    /// Services billed on this visit. A copy taken at registration time,
    /// later catalog edits do not touch it.
    pub services: Vec<Service>,
    /// Examination date as printed (`DD/MM/YYYY`)
    pub examination_date: String,
    /// Invoice number (`DDMMYY-SS`)
    pub invoice_number: String,
    /// Creation time, epoch milliseconds
    pub created_at: i64,
}

/// Partial update for a record. `None` fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordPatch {
    pub patient_info: Option<PatientInfo>,
    pub services: Option<Vec<Service>>,
    pub examination_date: Option<String>,
    pub invoice_number: Option<String>,
}

impl PatientRecord {
    /// Total billed amount for the visit, saturating at `u64::MAX`.
    pub fn total_amount(&self) -> u64 {
        self.services
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.price))
    }

    /// Names of the billed services, in billing order.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    /// Merge a patch into this record. Id and creation time never change.
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(info) = patch.patient_info {
            self.patient_info = info;
        }
        if let Some(services) = patch.services {
            self.services = services;
        }
        if let Some(date) = patch.examination_date {
            self.examination_date = date;
        }
        if let Some(number) = patch.invoice_number {
            self.invoice_number = number;
        }
    }

    /// Case-insensitive substring match over patient name, phone and address.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let info = &self.patient_info;
        info.name.to_lowercase().contains(&query)
            || info.phone.to_lowercase().contains(&query)
            || info.address.to_lowercase().contains(&query)
    }
}

//! Clinic Desk Core Library
//!
//! Front-desk core for a dental clinic: visit registration with daily invoice
//! numbering, a billable service catalog, patient visit records, and CSV /
//! spreadsheet exchange.
//!
//! # Architecture
//!
//! ```text
//!   services.csv ──► csv::decode ──► ServiceCatalog ◄── add / update / delete
//!                                          │
//!                                   (name lookup)
//!                                          │
//!   patients.csv ──► csv::decode ──► PatientRecords ◄── FrontDesk::register_visit
//!                                          │                    │
//!                                          │           InvoiceSequence (DDMMYY-SS)
//!                                          │                    │
//!                                          │              KeyValueStore
//!                                          ▼           (SQLite / memory slot)
//!                               ┌──────────┴──────────┐
//!                               ▼                     ▼
//!                          CSV export          Sheet export (.xlsx)
//! ```
//!
//! # Modules
//!
//! - [`csv`]: Quoted-field CSV codec and the service / patient schemas
//! - [`invoice`]: Daily invoice sequence and the printable invoice view
//! - [`models`]: Domain types (Service, PatientRecord, InvoiceCounter, etc.)
//! - [`repository`]: In-memory service catalog and patient records
//! - [`registration`]: Form validation
//! - [`desk`]: The front desk tying the pieces together
//! - [`store`] / [`db`]: Key-value persistence and CSV sources
//! - [`export`]: File naming and spreadsheet views

pub mod clock;
pub mod config;
pub mod csv;
pub mod db;
pub mod desk;
pub mod export;
pub mod invoice;
pub mod models;
pub mod registration;
pub mod repository;
pub mod store;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::DeskConfig;
pub use db::Database;
pub use desk::{DeskError, FrontDesk};
pub use invoice::{Invoice, InvoiceSequence};
pub use models::{
    InvoiceCounter, PatientInfo, PatientRecord, RecordPatch, Service, ServicePatch,
};
pub use registration::ValidationErrors;
pub use repository::{PatientRecords, ServiceCatalog};
pub use store::{KeyValueStore, MemoryStore};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use repository::LoadSummary;
use store::InlineSource;

type SharedDesk = FrontDesk<Box<dyn KeyValueStore + Send>, SystemClock>;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicDeskError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for ClinicDeskError {
    fn from(e: db::DbError) -> Self {
        ClinicDeskError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for ClinicDeskError {
    fn from(e: serde_json::Error) -> Self {
        ClinicDeskError::SerializationError(e.to_string())
    }
}

impl From<config::ConfigError> for ClinicDeskError {
    fn from(e: config::ConfigError) -> Self {
        ClinicDeskError::InvalidInput(e.to_string())
    }
}

impl From<DeskError> for ClinicDeskError {
    fn from(e: DeskError) -> Self {
        match e {
            DeskError::Repository(repository::RepositoryError::NotFound(id)) => {
                ClinicDeskError::NotFound(id)
            }
            other => ClinicDeskError::InvalidInput(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicDeskError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicDeskError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create the desk database at the given path and load the
/// configured CSV files. `config_json` may be omitted for defaults.
#[uniffi::export]
pub fn open_desk(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<ClinicDesk>, ClinicDeskError> {
    let config = match config_json {
        Some(json) => DeskConfig::from_json_str(&json)?,
        None => DeskConfig::default(),
    };
    let db = Database::open(&path)?;
    ClinicDesk::build(Box::new(db), config)
}

/// Create a desk whose counter lives in memory (for testing).
#[uniffi::export]
pub fn open_desk_in_memory() -> Result<Arc<ClinicDesk>, ClinicDeskError> {
    ClinicDesk::build(Box::new(MemoryStore::new()), DeskConfig::default())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe desk wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicDesk {
    desk: Arc<Mutex<SharedDesk>>,
}

impl ClinicDesk {
    fn build(
        store: Box<dyn KeyValueStore + Send>,
        config: DeskConfig,
    ) -> Result<Arc<Self>, ClinicDeskError> {
        let mut desk = FrontDesk::new(store, SystemClock, config)?;
        desk.load_configured();
        Ok(Arc::new(Self {
            desk: Arc::new(Mutex::new(desk)),
        }))
    }
}

#[uniffi::export]
impl ClinicDesk {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Replace the catalog with the given CSV text.
    pub fn load_services_csv(&self, csv: String) -> Result<FfiLoadSummary, ClinicDeskError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.load_services(&InlineSource(csv)).into())
    }

    /// All services in catalog order.
    pub fn list_services(&self) -> Result<Vec<FfiService>, ClinicDeskError> {
        let desk = self.desk.lock()?;
        Ok(desk.catalog().all().iter().cloned().map(Into::into).collect())
    }

    /// Search services by name, description or category.
    pub fn search_services(&self, query: String) -> Result<Vec<FfiService>, ClinicDeskError> {
        let desk = self.desk.lock()?;
        Ok(desk
            .catalog()
            .search(&query)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Add a service. Validation problems come back in the outcome.
    pub fn add_service(&self, service: FfiService) -> Result<FfiServiceOutcome, ClinicDeskError> {
        let mut desk = self.desk.lock()?;
        service_outcome(desk.add_service(service.into()))
    }

    /// Update a service. Validation problems come back in the outcome.
    pub fn update_service(
        &self,
        id: String,
        patch: FfiServicePatch,
    ) -> Result<FfiServiceOutcome, ClinicDeskError> {
        let mut desk = self.desk.lock()?;
        service_outcome(desk.update_service(&id, patch.into()))
    }

    /// Delete a service. Returns false if it did not exist.
    pub fn delete_service(&self, id: String) -> Result<bool, ClinicDeskError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.delete_service(&id))
    }

    // =========================================================================
    // Patient Record Operations
    // =========================================================================

    /// Replace the records with the given CSV text.
    pub fn load_patients_csv(&self, csv: String) -> Result<FfiLoadSummary, ClinicDeskError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.load_patients(&InlineSource(csv)).into())
    }

    /// All records in registration order.
    pub fn list_records(&self) -> Result<Vec<FfiPatientRecord>, ClinicDeskError> {
        let desk = self.desk.lock()?;
        Ok(desk.records().all().iter().map(Into::into).collect())
    }

    /// Search records by patient name, phone or address.
    pub fn search_records(&self, query: String) -> Result<Vec<FfiPatientRecord>, ClinicDeskError> {
        let desk = self.desk.lock()?;
        Ok(desk
            .records()
            .search(&query)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Update a record's patient details or services. Validation problems
    /// come back in the outcome.
    pub fn update_record(
        &self,
        id: String,
        patch: FfiRecordPatch,
    ) -> Result<FfiRecordOutcome, ClinicDeskError> {
        let mut desk = self.desk.lock()?;

        let services = match patch.service_ids {
            Some(ids) => Some(resolve_services(&desk, &ids)?),
            None => None,
        };
        let patch = RecordPatch {
            patient_info: patch.patient.map(Into::into),
            services,
            ..Default::default()
        };

        match desk.update_record(&id, patch) {
            Ok(record) => Ok(FfiRecordOutcome {
                record: Some((&record).into()),
                errors: HashMap::new(),
            }),
            Err(DeskError::Validation(errors)) => Ok(FfiRecordOutcome {
                record: None,
                errors: errors.into_map().into_iter().collect(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a record. Returns false if it did not exist.
    pub fn delete_record(&self, id: String) -> Result<bool, ClinicDeskError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.delete_record(&id))
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a visit for the selected service ids.
    pub fn register_visit(
        &self,
        patient: FfiPatientInfo,
        service_ids: Vec<String>,
    ) -> Result<FfiRegistrationOutcome, ClinicDeskError> {
        let mut desk = self.desk.lock()?;
        let services = resolve_services(&desk, &service_ids)?;

        match desk.register_visit(patient.into(), &services) {
            Ok(record) => Ok(FfiRegistrationOutcome {
                record: Some((&record).into()),
                invoice: Some(Invoice::from_record(&record).into()),
                errors: HashMap::new(),
            }),
            Err(DeskError::Validation(errors)) => Ok(FfiRegistrationOutcome {
                record: None,
                invoice: None,
                errors: errors.into_map().into_iter().collect(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Invoice for a saved record.
    pub fn get_invoice(&self, record_id: String) -> Result<Option<FfiInvoice>, ClinicDeskError> {
        let desk = self.desk.lock()?;
        Ok(desk.invoice(&record_id).map(Into::into))
    }

    /// Issue the next invoice number without registering a visit.
    pub fn next_invoice_number(&self) -> Result<String, ClinicDeskError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.next_invoice_number())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export the service catalog as CSV.
    pub fn export_services_csv(&self) -> Result<FfiExportFile, ClinicDeskError> {
        let desk = self.desk.lock()?;
        Ok(desk.export_services_csv().into())
    }

    /// Export the patient records as CSV.
    pub fn export_patients_csv(&self) -> Result<FfiExportFile, ClinicDeskError> {
        let desk = self.desk.lock()?;
        Ok(desk.export_patients_csv().into())
    }

    /// Export the service catalog as a sheet (JSON) named for an .xlsx file.
    pub fn export_services_sheet(&self) -> Result<FfiExportFile, ClinicDeskError> {
        let desk = self.desk.lock()?;
        let export = desk.export_services_sheet();
        Ok(FfiExportFile {
            file_name: export.file_name,
            contents: export.sheet.to_json()?,
        })
    }

    /// Export the patient records as a sheet (JSON) named for an .xlsx file.
    pub fn export_patients_sheet(&self) -> Result<FfiExportFile, ClinicDeskError> {
        let desk = self.desk.lock()?;
        let export = desk.export_patients_sheet();
        Ok(FfiExportFile {
            file_name: export.file_name,
            contents: export.sheet.to_json()?,
        })
    }
}

/// Look up catalog services by id, in the given order.
fn resolve_services(desk: &SharedDesk, ids: &[String]) -> Result<Vec<Service>, ClinicDeskError> {
    ids.iter()
        .map(|id| {
            desk.catalog()
                .get(id)
                .cloned()
                .ok_or_else(|| ClinicDeskError::NotFound(id.clone()))
        })
        .collect()
}

fn service_outcome(result: desk::DeskResult<Service>) -> Result<FfiServiceOutcome, ClinicDeskError> {
    match result {
        Ok(service) => Ok(FfiServiceOutcome {
            service: Some(service.into()),
            errors: HashMap::new(),
        }),
        Err(DeskError::Validation(errors)) => Ok(FfiServiceOutcome {
            service: None,
            errors: errors.into_map().into_iter().collect(),
        }),
        Err(e) => Err(e.into()),
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe service.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiService {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub category: String,
}

impl From<Service> for FfiService {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            price: service.price,
            category: service.category,
        }
    }
}

impl From<FfiService> for Service {
    fn from(service: FfiService) -> Self {
        Service {
            id: service.id,
            name: service.name,
            description: service.description,
            price: service.price,
            category: service.category,
        }
    }
}

/// FFI-safe service patch.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub category: Option<String>,
}

impl From<FfiServicePatch> for ServicePatch {
    fn from(patch: FfiServicePatch) -> Self {
        ServicePatch {
            name: patch.name,
            description: patch.description,
            price: patch.price,
            category: patch.category,
        }
    }
}

/// Result of adding or updating a service.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiServiceOutcome {
    pub service: Option<FfiService>,
    pub errors: HashMap<String, String>,
}

/// FFI-safe patient info.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
}

impl From<FfiPatientInfo> for PatientInfo {
    fn from(info: FfiPatientInfo) -> Self {
        PatientInfo {
            name: info.name,
            phone: info.phone,
            address: info.address,
            notes: info.notes.filter(|n| !n.is_empty()),
        }
    }
}

impl From<&PatientInfo> for FfiPatientInfo {
    fn from(info: &PatientInfo) -> Self {
        Self {
            name: info.name.clone(),
            phone: info.phone.clone(),
            address: info.address.clone(),
            notes: info.notes.clone(),
        }
    }
}

/// FFI-safe patient record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub id: String,
    pub patient: FfiPatientInfo,
    pub services: Vec<FfiService>,
    pub examination_date: String,
    pub invoice_number: String,
    pub total_amount: u64,
    pub created_at: i64,
}

impl From<&PatientRecord> for FfiPatientRecord {
    fn from(record: &PatientRecord) -> Self {
        Self {
            id: record.id.clone(),
            patient: (&record.patient_info).into(),
            services: record.services.iter().cloned().map(Into::into).collect(),
            examination_date: record.examination_date.clone(),
            invoice_number: record.invoice_number.clone(),
            total_amount: record.total_amount(),
            created_at: record.created_at,
        }
    }
}

/// FFI-safe invoice line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInvoiceLine {
    pub position: u32,
    pub name: String,
    pub price: u64,
}

/// FFI-safe record patch. `None` fields keep their current value.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRecordPatch {
    pub patient: Option<FfiPatientInfo>,
    pub service_ids: Option<Vec<String>>,
}

/// Result of updating a record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRecordOutcome {
    pub record: Option<FfiPatientRecord>,
    pub errors: HashMap<String, String>,
}

/// FFI-safe printable invoice.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInvoice {
    pub number: String,
    pub patient: FfiPatientInfo,
    pub examination_date: String,
    pub lines: Vec<FfiInvoiceLine>,
    pub total: u64,
    pub total_display: String,
}

impl From<Invoice> for FfiInvoice {
    fn from(invoice: Invoice) -> Self {
        let total_display = invoice.total_display();
        Self {
            number: invoice.number,
            patient: (&invoice.patient).into(),
            examination_date: invoice.examination_date,
            lines: invoice
                .lines
                .into_iter()
                .map(|l| FfiInvoiceLine {
                    position: l.position,
                    name: l.name,
                    price: l.price,
                })
                .collect(),
            total: invoice.total,
            total_display,
        }
    }
}

/// Result of registering a visit: either the saved record and its invoice,
/// or the field errors to show on the form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegistrationOutcome {
    pub record: Option<FfiPatientRecord>,
    pub invoice: Option<FfiInvoice>,
    pub errors: HashMap<String, String>,
}

/// FFI-safe load summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLoadSummary {
    pub loaded: u32,
    pub skipped_rows: u32,
    pub degraded_rows: u32,
    pub used_defaults: bool,
}

impl From<LoadSummary> for FfiLoadSummary {
    fn from(summary: LoadSummary) -> Self {
        Self {
            loaded: summary.loaded as u32,
            skipped_rows: summary.skipped.len() as u32,
            degraded_rows: summary.degraded.len() as u32,
            used_defaults: summary.used_defaults,
        }
    }
}

/// FFI-safe export file.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExportFile {
    pub file_name: String,
    pub contents: String,
}

impl From<export::ExportFile> for FfiExportFile {
    fn from(file: export::ExportFile) -> Self {
        Self {
            file_name: file.file_name,
            contents: file.contents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> FfiPatientInfo {
        FfiPatientInfo {
            name: "Trần Thị Bình".into(),
            phone: "0912345678".into(),
            address: "Đà Nẵng".into(),
            notes: Some(String::new()),
        }
    }

    #[test]
    fn test_register_visit_through_ffi() {
        let desk = open_desk_in_memory().unwrap();
        let outcome = desk
            .register_visit(patient(), vec!["service-1".into(), "service-5".into()])
            .unwrap();

        assert!(outcome.errors.is_empty());
        let record = outcome.record.unwrap();
        assert_eq!(record.total_amount, 1_700_000);
        assert_eq!(record.patient.notes, None);
        assert!(record.invoice_number.ends_with("-01"));
        assert_eq!(outcome.invoice.unwrap().lines.len(), 2);
        assert_eq!(desk.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_register_visit_validation_is_returned() {
        let desk = open_desk_in_memory().unwrap();
        let outcome = desk.register_visit(patient(), vec![]).unwrap();

        assert!(outcome.record.is_none());
        assert!(outcome.errors.contains_key("services"));
    }

    #[test]
    fn test_register_visit_unknown_service_id() {
        let desk = open_desk_in_memory().unwrap();
        let err = desk
            .register_visit(patient(), vec!["service-99".into()])
            .unwrap_err();
        assert!(matches!(err, ClinicDeskError::NotFound(_)));
    }

    #[test]
    fn test_update_record_through_ffi() {
        let desk = open_desk_in_memory().unwrap();
        let record = desk
            .register_visit(patient(), vec!["service-1".into()])
            .unwrap()
            .record
            .unwrap();

        let mut edited = record.patient.clone();
        edited.notes = Some("Dị ứng penicillin".into());
        let outcome = desk
            .update_record(
                record.id.clone(),
                FfiRecordPatch {
                    patient: Some(edited),
                    service_ids: Some(vec!["service-1".into(), "service-5".into()]),
                },
            )
            .unwrap();

        assert!(outcome.errors.is_empty());
        let updated = outcome.record.unwrap();
        assert_eq!(updated.patient.notes.as_deref(), Some("Dị ứng penicillin"));
        assert_eq!(updated.total_amount, 1_700_000);
        assert_eq!(updated.invoice_number, record.invoice_number);

        let listed = desk.list_records().unwrap();
        assert_eq!(listed[0].patient.notes.as_deref(), Some("Dị ứng penicillin"));
    }

    #[test]
    fn test_update_record_errors() {
        let desk = open_desk_in_memory().unwrap();
        let record = desk
            .register_visit(patient(), vec!["service-1".into()])
            .unwrap()
            .record
            .unwrap();

        let mut edited = record.patient.clone();
        edited.phone = "123".into();
        let outcome = desk
            .update_record(
                record.id.clone(),
                FfiRecordPatch {
                    patient: Some(edited),
                    service_ids: None,
                },
            )
            .unwrap();
        assert!(outcome.record.is_none());
        assert!(outcome.errors.contains_key("phone"));

        let err = desk
            .update_record(
                "record-missing".into(),
                FfiRecordPatch {
                    patient: None,
                    service_ids: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ClinicDeskError::NotFound(_)));

        assert!(desk.delete_record(record.id).unwrap());
        assert!(desk.list_records().unwrap().is_empty());
    }

    #[test]
    fn test_service_outcome() {
        let desk = open_desk_in_memory().unwrap();
        let outcome = desk
            .add_service(FfiService {
                id: String::new(),
                name: "Chụp X-quang".into(),
                description: String::new(),
                price: 150_000,
                category: "Chẩn đoán".into(),
            })
            .unwrap();

        assert!(outcome.service.is_none());
        assert!(outcome.errors.contains_key("description"));
        assert_eq!(desk.list_services().unwrap().len(), 12);
    }

    #[test]
    fn test_open_desk_persists_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.db").to_string_lossy().to_string();

        let first = open_desk(path.clone(), None).unwrap();
        first.next_invoice_number().unwrap();
        first.next_invoice_number().unwrap();
        drop(first);

        let reopened = open_desk(path, Some("{}".into())).unwrap();
        assert!(reopened.next_invoice_number().unwrap().ends_with("-03"));
    }

    #[test]
    fn test_open_desk_rejects_bad_config() {
        let err = open_desk(":memory:".into(), Some("not json".into()))
            .err()
            .unwrap();
        assert!(matches!(err, ClinicDeskError::InvalidInput(_)));
    }
}

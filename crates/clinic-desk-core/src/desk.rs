//! The front desk: catalog, visit records, invoice numbering and exports.

use thiserror::Error;
use tracing::info;

use crate::clock::Clock;
use crate::config::{ConfigError, DeskConfig};
use crate::export::{
    export_file_name, patients_sheet, services_sheet, ExportFile, SheetExport, CSV_EXTENSION,
    XLSX_EXTENSION,
};
use crate::invoice::{Invoice, InvoiceSequence};
use crate::models::{
    InvoiceCounter, PatientInfo, PatientRecord, RecordPatch, Service, ServicePatch,
};
use crate::registration::{validate_service, validate_visit, ValidationErrors};
use crate::repository::{LoadSummary, PatientRecords, RepositoryError, ServiceCatalog};
use crate::store::{CsvSource, FileSource, KeyValueStore};

/// Desk errors.
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

pub type DeskResult<T> = Result<T, DeskError>;

/// Summaries of a startup load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupLoad {
    pub services: LoadSummary,
    pub patients: LoadSummary,
}

/// Everything the front-desk screens operate on.
pub struct FrontDesk<S: KeyValueStore, C: Clock> {
    config: DeskConfig,
    catalog: ServiceCatalog,
    records: PatientRecords,
    store: S,
    sequence: InvoiceSequence<C>,
}

impl<S: KeyValueStore, C: Clock> FrontDesk<S, C> {
    /// Create a desk with the default catalog and no records.
    pub fn new(store: S, clock: C, config: DeskConfig) -> DeskResult<Self> {
        config.validate()?;
        let sequence =
            InvoiceSequence::new(clock, config.utc_offset()?).with_key(config.counter_key.clone());

        Ok(Self {
            config,
            catalog: ServiceCatalog::with_defaults(),
            records: PatientRecords::new(),
            store,
            sequence,
        })
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn records(&self) -> &PatientRecords {
        &self.records
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn now_millis(&self) -> i64 {
        self.sequence.clock().now_millis()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load the CSV files named in the config. Services fall back to the
    /// default catalog, patients to an empty list.
    pub fn load_configured(&mut self) -> StartupLoad {
        let services = match self.config.services_csv.clone() {
            Some(path) => self.load_services(&FileSource::new(path)),
            None => {
                self.catalog = ServiceCatalog::with_defaults();
                LoadSummary {
                    loaded: self.catalog.len(),
                    used_defaults: true,
                    ..Default::default()
                }
            }
        };

        let patients = match self.config.patients_csv.clone() {
            Some(path) => self.load_patients(&FileSource::new(path)),
            None => LoadSummary::default(),
        };

        StartupLoad { services, patients }
    }

    /// Replace the catalog from a CSV source.
    pub fn load_services<Src: CsvSource + ?Sized>(&mut self, source: &Src) -> LoadSummary {
        self.catalog.load(source)
    }

    /// Replace the records from a CSV source, resolving names against the current catalog.
    pub fn load_patients<Src: CsvSource + ?Sized>(&mut self, source: &Src) -> LoadSummary {
        let now = self.now_millis();
        self.records.load(source, self.catalog.all(), now)
    }

    // =========================================================================
    // Catalog editing
    // =========================================================================

    /// Validate and add a service. The name is trimmed and an empty id is
    /// replaced by `service-<epoch ms>`.
    pub fn add_service(&mut self, mut service: Service) -> DeskResult<Service> {
        service.name = service.name.trim().to_string();
        validate_service(&service).into_result()?;

        if service.id.trim().is_empty() {
            let base = format!("service-{}", self.now_millis());
            service.id = unique_id(&base, |id| self.catalog.get(id).is_some());
        }

        self.catalog.add(service.clone())?;
        Ok(service)
    }

    /// Validate the merged result and apply the patch.
    pub fn update_service(&mut self, id: &str, patch: ServicePatch) -> DeskResult<Service> {
        let patch = ServicePatch {
            name: patch.name.map(|name| name.trim().to_string()),
            ..patch
        };
        let mut updated = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        updated.apply(patch.clone());
        validate_service(&updated).into_result()?;

        self.catalog.update(id, patch);
        Ok(updated)
    }

    pub fn delete_service(&mut self, id: &str) -> bool {
        self.catalog.delete(id)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Issue the next invoice number.
    pub fn next_invoice_number(&mut self) -> String {
        self.sequence.next_invoice_number(&mut self.store)
    }

    /// Today's counter without advancing it.
    pub fn invoice_counter(&self) -> InvoiceCounter {
        self.sequence.current(&self.store)
    }

    /// Register a visit: validate, number the invoice, snapshot the services
    /// and save the record.
    ///
    /// Nothing is numbered or saved when validation fails.
    pub fn register_visit(
        &mut self,
        info: PatientInfo,
        services: &[Service],
    ) -> DeskResult<PatientRecord> {
        validate_visit(&info, services).into_result()?;

        let now = self.sequence.local_now();
        let created_at = now.timestamp_millis();
        let base = format!("record-{}", created_at);
        let id = unique_id(&base, |id| self.records.contains(id));
        let invoice_number = self.next_invoice_number();

        let record = PatientRecord {
            id,
            patient_info: info,
            services: services.to_vec(),
            examination_date: now.format("%d/%m/%Y").to_string(),
            invoice_number,
            created_at,
        };

        self.records.add(record.clone())?;
        info!(id = %record.id, invoice = %record.invoice_number, "Registered visit");
        Ok(record)
    }

    /// Validate the merged record and apply the patch.
    pub fn update_record(&mut self, id: &str, patch: RecordPatch) -> DeskResult<PatientRecord> {
        let mut updated = self
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        updated.apply(patch.clone());
        validate_visit(&updated.patient_info, &updated.services).into_result()?;

        self.records.update(id, patch);
        info!(id = %id, "Updated visit record");
        Ok(updated)
    }

    pub fn delete_record(&mut self, id: &str) -> bool {
        self.records.delete(id)
    }

    /// Invoice view of a saved record.
    pub fn invoice(&self, record_id: &str) -> Option<Invoice> {
        self.records.get(record_id).map(Invoice::from_record)
    }

    // =========================================================================
    // Exports
    // =========================================================================

    pub fn export_services_csv(&self) -> ExportFile {
        ExportFile {
            file_name: export_file_name(
                &self.config.services_export_name,
                self.sequence.today(),
                CSV_EXTENSION,
            ),
            contents: self.catalog.to_csv(),
        }
    }

    pub fn export_patients_csv(&self) -> ExportFile {
        ExportFile {
            file_name: export_file_name(
                &self.config.patients_export_name,
                self.sequence.today(),
                CSV_EXTENSION,
            ),
            contents: self.records.to_csv(),
        }
    }

    pub fn export_services_sheet(&self) -> SheetExport {
        SheetExport {
            file_name: export_file_name(
                &self.config.services_export_name,
                self.sequence.today(),
                XLSX_EXTENSION,
            ),
            sheet: services_sheet(self.catalog.all()),
        }
    }

    pub fn export_patients_sheet(&self) -> SheetExport {
        SheetExport {
            file_name: export_file_name(
                &self.config.patients_export_name,
                self.sequence.today(),
                XLSX_EXTENSION,
            ),
            sheet: patients_sheet(self.records.all(), self.sequence.offset()),
        }
    }
}

/// `base`, or `base-2`, `base-3`, ... until `taken` says no.
fn unique_id(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

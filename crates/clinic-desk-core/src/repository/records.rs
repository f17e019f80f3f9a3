//! Patient visit records.

use tracing::{error, info};

use super::{LoadSummary, RepositoryError, RepositoryResult};
use crate::csv::{decode, encode, PatientRecordSchema};
use crate::models::{PatientRecord, RecordPatch, Service};
use crate::store::CsvSource;

/// Saved visits, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientRecords {
    records: Vec<PatientRecord>,
}

impl PatientRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<PatientRecord>) -> Self {
        Self { records }
    }

    /// Replace the records from a CSV source.
    ///
    /// Service names are resolved against `catalog`. A source that cannot be
    /// read leaves the collection empty.
    pub fn load<S: CsvSource + ?Sized>(
        &mut self,
        source: &S,
        catalog: &[Service],
        now_millis: i64,
    ) -> LoadSummary {
        match source.read_to_string() {
            Ok(text) => self.load_csv(&text, catalog, now_millis),
            Err(e) => {
                error!(error = %e, "Failed to load patient records");
                self.records.clear();
                LoadSummary::default()
            }
        }
    }

    /// Replace the records from CSV text.
    pub fn load_csv(&mut self, text: &str, catalog: &[Service], now_millis: i64) -> LoadSummary {
        let decoded = decode(text, &PatientRecordSchema::new(catalog, now_millis));
        let summary = LoadSummary::from_decoded(&decoded);
        self.records = decoded.records;
        info!(
            loaded = summary.loaded,
            skipped = summary.skipped.len(),
            degraded = summary.degraded.len(),
            "Loaded patient records"
        );
        summary
    }

    pub fn all(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PatientRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a record. Ids must be unique.
    pub fn add(&mut self, record: PatientRecord) -> RepositoryResult<()> {
        if self.contains(&record.id) {
            return Err(RepositoryError::DuplicateId(record.id));
        }
        self.records.push(record);
        Ok(())
    }

    /// Merge a patch into the record with `id`. Returns false if absent.
    pub fn update(&mut self, id: &str, patch: RecordPatch) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove the record with `id`. Returns false if absent.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Records whose patient name, phone or address contain `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<&PatientRecord> {
        let query = query.trim();
        self.records.iter().filter(|r| r.matches(query)).collect()
    }

    /// Encode the records as CSV.
    pub fn to_csv(&self) -> String {
        encode(&self.records, &PatientRecordSchema::for_export())
    }
}

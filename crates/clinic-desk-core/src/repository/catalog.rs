//! Service catalog.

use tracing::{error, info, warn};

use super::{LoadSummary, RepositoryError, RepositoryResult};
use crate::csv::{decode, encode, ServiceSchema};
use crate::models::{default_catalog, Service, ServicePatch};
use crate::store::CsvSource;

/// The current set of billable services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCatalog {
    services: Vec<Service>,
}

impl ServiceCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the given services.
    pub fn from_services(services: Vec<Service>) -> Self {
        Self { services }
    }

    /// Catalog holding the bundled default services.
    pub fn with_defaults() -> Self {
        Self::from_services(default_catalog())
    }

    /// Replace the catalog from a CSV source.
    ///
    /// A source that cannot be read, or yields no usable rows, falls back to
    /// the bundled defaults.
    pub fn load<S: CsvSource + ?Sized>(&mut self, source: &S) -> LoadSummary {
        match source.read_to_string() {
            Ok(text) => self.load_csv(&text),
            Err(e) => {
                error!(error = %e, "Failed to load services, using default catalog");
                self.use_defaults(LoadSummary::default())
            }
        }
    }

    /// Replace the catalog from CSV text.
    pub fn load_csv(&mut self, text: &str) -> LoadSummary {
        let decoded = decode(text, &ServiceSchema);
        let summary = LoadSummary::from_decoded(&decoded);

        if decoded.records.is_empty() {
            warn!("Services CSV has no usable rows, using default catalog");
            return self.use_defaults(summary);
        }

        self.services = decoded.records;
        info!(
            loaded = summary.loaded,
            skipped = summary.skipped.len(),
            "Loaded service catalog"
        );
        summary
    }

    fn use_defaults(&mut self, mut summary: LoadSummary) -> LoadSummary {
        self.services = default_catalog();
        summary.loaded = self.services.len();
        summary.used_defaults = true;
        summary
    }

    /// All services in catalog order.
    pub fn all(&self) -> &[Service] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Get a service by id.
    pub fn get(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Get a service by exact (trimmed) name.
    pub fn find_by_name(&self, name: &str) -> Option<&Service> {
        let name = name.trim();
        self.services.iter().find(|s| s.name == name)
    }

    /// Add a service. Ids must be unique.
    pub fn add(&mut self, service: Service) -> RepositoryResult<()> {
        if self.get(&service.id).is_some() {
            return Err(RepositoryError::DuplicateId(service.id));
        }
        self.services.push(service);
        Ok(())
    }

    /// Merge a patch into the service with `id`. Returns false if absent.
    pub fn update(&mut self, id: &str, patch: ServicePatch) -> bool {
        match self.services.iter_mut().find(|s| s.id == id) {
            Some(service) => {
                service.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove the service with `id`. Returns false if absent.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.services.len();
        self.services.retain(|s| s.id != id);
        self.services.len() != before
    }

    /// Services whose name, description or category contain `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<&Service> {
        let query = query.trim();
        self.services.iter().filter(|s| s.matches(query)).collect()
    }

    /// Encode the catalog as CSV.
    pub fn to_csv(&self) -> String {
        encode(&self.services, &ServiceSchema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InlineSource, SourceError};

    struct FailingSource;

    impl CsvSource for FailingSource {
        fn read_to_string(&self) -> Result<String, SourceError> {
            Err(SourceError::Unavailable("404 Not Found".into()))
        }
    }

    fn sample() -> ServiceCatalog {
        ServiceCatalog::from_services(vec![
            Service::new("s1", "Cleaning", "Scale and polish", 500_000, "Hygiene"),
            Service::new("s2", "Whitening", "Bleaching", 2_500_000, "Cosmetic"),
        ])
    }

    #[test]
    fn test_load_from_source() {
        let mut catalog = ServiceCatalog::new();
        let summary = catalog.load(&InlineSource(
            "id,name,description,price,category\ns1,A,B,100,C\nbad,row\n".into(),
        ));

        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert!(!summary.used_defaults);
        assert_eq!(catalog.all()[0].id, "s1");
    }

    #[test]
    fn test_load_failure_uses_defaults() {
        let mut catalog = sample();
        let summary = catalog.load(&FailingSource);

        assert!(summary.used_defaults);
        assert_eq!(summary.loaded, 12);
        assert_eq!(catalog.len(), 12);
        assert!(catalog.get("service-1").is_some());
    }

    #[test]
    fn test_load_without_rows_uses_defaults() {
        let mut catalog = ServiceCatalog::new();
        let summary = catalog.load_csv("id,name,description,price,category\n");
        assert!(summary.used_defaults);
        assert_eq!(catalog.len(), 12);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut catalog = sample();
        let err = catalog
            .add(Service::new("s1", "Other", "", 1, ""))
            .unwrap_err();
        assert_eq!(err, RepositoryError::DuplicateId("s1".into()));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_update_and_delete() {
        let mut catalog = sample();

        assert!(catalog.update(
            "s2",
            ServicePatch {
                name: Some("Tẩy trắng".into()),
                ..Default::default()
            }
        ));
        assert_eq!(catalog.get("s2").unwrap().name, "Tẩy trắng");
        assert_eq!(catalog.get("s2").unwrap().price, 2_500_000);
        assert!(!catalog.update("missing", ServicePatch::default()));

        assert!(catalog.delete("s1"));
        assert!(!catalog.delete("s1"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_search() {
        let catalog = sample();
        assert_eq!(catalog.search("POLISH").len(), 1);
        assert_eq!(catalog.search("cosmetic")[0].id, "s2");
        assert_eq!(catalog.search("").len(), 2);
        assert!(catalog.search("implant").is_empty());
    }

    #[test]
    fn test_find_by_name_trims() {
        let catalog = sample();
        assert_eq!(catalog.find_by_name("  Cleaning ").unwrap().id, "s1");
        assert!(catalog.find_by_name("cleaning").is_none());
    }
}

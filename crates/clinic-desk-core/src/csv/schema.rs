//! Column schemas for services and patient records.

use tracing::debug;

use super::{CsvSchema, Field, RowOutcome};
use crate::models::{PatientInfo, PatientRecord, Service};

/// Separator between service names in the patient `services` column.
pub const SERVICE_NAME_SEPARATOR: &str = ";";

/// `id,name,description,price,category`
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceSchema;

impl CsvSchema for ServiceSchema {
    type Record = Service;
    const HEADER: &'static [&'static str] = &["id", "name", "description", "price", "category"];

    fn to_fields(&self, service: &Service) -> Vec<Field> {
        vec![
            service.id.as_str().into(),
            service.name.as_str().into(),
            service.description.as_str().into(),
            Field::Unsigned(service.price),
            service.category.as_str().into(),
        ]
    }

    fn from_fields(&self, fields: &[String]) -> RowOutcome<Service> {
        let raw_price = fields[3].trim();
        let (price, degraded) = match raw_price.parse::<u64>() {
            Ok(price) => (price, None),
            Err(_) => (0, Some(format!("invalid price '{}', using 0", raw_price))),
        };

        let service = Service {
            id: fields[0].clone(),
            name: fields[1].clone(),
            description: fields[2].clone(),
            price,
            category: fields[4].clone(),
        };

        match degraded {
            Some(reason) => RowOutcome::Degraded(service, reason),
            None => RowOutcome::Parsed(service),
        }
    }
}

/// `id,name,phone,address,notes,examinationDate,invoiceNumber,services,createdAt`
///
/// The `services` column holds `;`-separated service names. On decode each
/// name is looked up in `catalog`; names with no match become zero-priced
/// placeholder services so the visit itself is kept.
#[derive(Debug, Clone, Copy)]
pub struct PatientRecordSchema<'a> {
    catalog: &'a [Service],
    fallback_created_at: i64,
}

impl<'a> PatientRecordSchema<'a> {
    /// `fallback_created_at` (epoch ms) is used when a row's `createdAt` is missing or invalid.
    pub fn new(catalog: &'a [Service], fallback_created_at: i64) -> Self {
        Self {
            catalog,
            fallback_created_at,
        }
    }

    /// Schema for encoding only; decoding with it resolves every name to a placeholder.
    pub fn for_export() -> PatientRecordSchema<'static> {
        PatientRecordSchema {
            catalog: &[],
            fallback_created_at: 0,
        }
    }

    /// Resolve `;`-separated names, returning the services and the unmatched names.
    fn resolve_services(&self, column: &str) -> (Vec<Service>, Vec<String>) {
        let mut services = Vec::new();
        let mut unmatched = Vec::new();

        for name in column
            .split(SERVICE_NAME_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            match self.catalog.iter().find(|s| s.name == name) {
                Some(service) => services.push(service.clone()),
                None => {
                    debug!(name, "Service name not in catalog, using placeholder");
                    unmatched.push(name.to_string());
                    services.push(Service::placeholder(name));
                }
            }
        }

        (services, unmatched)
    }
}

impl CsvSchema for PatientRecordSchema<'_> {
    type Record = PatientRecord;
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "phone",
        "address",
        "notes",
        "examinationDate",
        "invoiceNumber",
        "services",
        "createdAt",
    ];

    fn to_fields(&self, record: &PatientRecord) -> Vec<Field> {
        let services = record
            .services
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(SERVICE_NAME_SEPARATOR);

        vec![
            record.id.as_str().into(),
            record.patient_info.name.as_str().into(),
            record.patient_info.phone.as_str().into(),
            record.patient_info.address.as_str().into(),
            record.patient_info.notes.as_deref().unwrap_or("").into(),
            record.examination_date.as_str().into(),
            record.invoice_number.as_str().into(),
            services.into(),
            Field::Integer(record.created_at),
        ]
    }

    fn from_fields(&self, fields: &[String]) -> RowOutcome<PatientRecord> {
        let mut problems = Vec::new();

        let (services, unmatched) = self.resolve_services(&fields[7]);
        if !unmatched.is_empty() {
            problems.push(format!(
                "unknown services [{}] priced at 0",
                unmatched.join(", ")
            ));
        }

        let raw_created = fields[8].trim();
        let created_at = match raw_created.parse::<i64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                problems.push(format!("invalid createdAt '{}', using now", raw_created));
                self.fallback_created_at
            }
        };

        let notes = Some(fields[4].clone()).filter(|n| !n.is_empty());

        let record = PatientRecord {
            id: fields[0].clone(),
            patient_info: PatientInfo {
                name: fields[1].clone(),
                phone: fields[2].clone(),
                address: fields[3].clone(),
                notes,
            },
            services,
            examination_date: fields[5].clone(),
            invoice_number: fields[6].clone(),
            created_at,
        };

        if problems.is_empty() {
            RowOutcome::Parsed(record)
        } else {
            RowOutcome::Degraded(record, problems.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::{decode, encode};
    use crate::models::default_catalog;

    #[test]
    fn test_service_row() {
        let decoded = decode(
            "id,name,description,price,category\nservice-1,Khám,\"Tổng quát, tư vấn\",200000,Khám tổng quát",
            &ServiceSchema,
        );
        assert!(decoded.is_clean());
        assert_eq!(
            decoded.records,
            vec![Service::new(
                "service-1",
                "Khám",
                "Tổng quát, tư vấn",
                200_000,
                "Khám tổng quát"
            )]
        );
    }

    #[test]
    fn test_service_invalid_price_degrades_to_zero() {
        let decoded = decode(
            "id,name,description,price,category\ns1,X,Y,abc,Z\ns2,X,Y,-5,Z",
            &ServiceSchema,
        );
        assert_eq!(decoded.records.len(), 2);
        assert!(decoded.records.iter().all(|s| s.price == 0));
        assert_eq!(decoded.degraded.len(), 2);
        assert!(decoded.skipped.is_empty());
    }

    #[test]
    fn test_service_price_is_written_unquoted() {
        let csv = encode(&[Service::new("s1", "A", "B", 1500, "C")], &ServiceSchema);
        assert_eq!(csv.lines().nth(1), Some("s1,A,B,1500,C"));
    }

    #[test]
    fn test_patient_row_resolves_catalog_names() {
        let catalog = default_catalog();
        let schema = PatientRecordSchema::new(&catalog, 42);
        let decoded = decode(
            "id,name,phone,address,notes,examinationDate,invoiceNumber,services,createdAt\n\
             record-1,An,0901234567,\"12 Lê Lợi, Huế\",,10/05/2024,100524-01, Khám và tư vấn ;Cạo vôi răng,1715300000000",
            &schema,
        );

        assert!(decoded.is_clean());
        let record = &decoded.records[0];
        assert_eq!(record.patient_info.address, "12 Lê Lợi, Huế");
        assert_eq!(record.patient_info.notes, None);
        assert_eq!(record.services[0].id, "service-1");
        assert_eq!(record.services[1].id, "service-2");
        assert_eq!(record.total_amount(), 700_000);
        assert_eq!(record.created_at, 1_715_300_000_000);
    }

    #[test]
    fn test_patient_row_invalid_created_at_uses_fallback() {
        let catalog = default_catalog();
        let schema = PatientRecordSchema::new(&catalog, 42);
        let decoded = decode(
            "header\nrecord-1,An,0901234567,Huế,,10/05/2024,100524-01,Cạo vôi răng,",
            &schema,
        );
        assert_eq!(decoded.records[0].created_at, 42);
        assert_eq!(decoded.degraded.len(), 1);
    }

    #[test]
    fn test_patient_row_empty_services_column() {
        let schema = PatientRecordSchema::new(&[], 1);
        let decoded = decode("header\nr,An,1,Huế,,d,i,,5", &schema);
        assert!(decoded.records[0].services.is_empty());
        assert!(decoded.is_clean());
    }

    #[test]
    fn test_patient_encode_joins_service_names() {
        let record = PatientRecord {
            id: "record-7".into(),
            patient_info: PatientInfo {
                name: "Bình".into(),
                phone: "0912345678".into(),
                address: "Đà Nẵng".into(),
                notes: Some("Dị ứng \"penicillin\"".into()),
            },
            services: default_catalog().into_iter().take(2).collect(),
            examination_date: "10/05/2024".into(),
            invoice_number: "100524-02".into(),
            created_at: 1_715_300_000_000,
        };

        let csv = encode(&[record], &PatientRecordSchema::for_export());
        assert_eq!(
            csv.lines().nth(1),
            Some(
                "record-7,Bình,0912345678,Đà Nẵng,\"Dị ứng \"\"penicillin\"\"\",10/05/2024,100524-02,Khám và tư vấn;Cạo vôi răng,1715300000000"
            )
        );
    }
}

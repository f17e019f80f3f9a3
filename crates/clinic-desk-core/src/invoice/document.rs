//! Printable invoice view of a visit.

use serde::{Deserialize, Serialize};

use crate::models::{format_vnd, PatientInfo, PatientRecord};

/// One billed line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceLine {
    /// 1-based position on the invoice
    pub position: u32,
    pub name: String,
    pub price: u64,
}

/// Everything a printer shell needs to render an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invoice {
    pub number: String,
    pub patient: PatientInfo,
    pub examination_date: String,
    pub lines: Vec<InvoiceLine>,
    pub total: u64,
}

impl Invoice {
    /// Build the invoice for a saved visit.
    pub fn from_record(record: &PatientRecord) -> Self {
        let lines = record
            .services
            .iter()
            .zip(1..)
            .map(|(service, position)| InvoiceLine {
                position,
                name: service.name.clone(),
                price: service.price,
            })
            .collect();

        Self {
            number: record.invoice_number.clone(),
            patient: record.patient_info.clone(),
            examination_date: record.examination_date.clone(),
            lines,
            total: record.total_amount(),
        }
    }

    /// Total formatted in VND.
    pub fn total_display(&self) -> String {
        format_vnd(self.total)
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Service;

    #[test]
    fn test_from_record() {
        let record = PatientRecord {
            id: "record-1".into(),
            patient_info: PatientInfo::new("An", "0901234567", "Huế"),
            services: vec![
                Service::new("service-5", "Nhổ răng khôn", "", 1_500_000, ""),
                Service::new("service-1", "Khám và tư vấn", "", 200_000, ""),
            ],
            examination_date: "10/05/2024".into(),
            invoice_number: "100524-03".into(),
            created_at: 1,
        };

        let invoice = Invoice::from_record(&record);
        assert_eq!(invoice.number, "100524-03");
        assert_eq!(invoice.lines.len(), 2);
        assert_eq!(invoice.lines[0].position, 1);
        assert_eq!(invoice.lines[1].position, 2);
        assert_eq!(invoice.lines[1].name, "Khám và tư vấn");
        assert_eq!(invoice.total, 1_700_000);
        assert_eq!(invoice.total_display(), "1.700.000 ₫");
        assert!(invoice.to_json().unwrap().contains("100524-03"));
    }
}

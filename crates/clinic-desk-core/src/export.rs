//! CSV and spreadsheet exports of the desk tables.
//!
//! CSV exports use the same column layout the loaders read. Spreadsheet
//! exports are tabular [`Sheet`]s with display headers; the shell turns them
//! into a workbook file.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{PatientRecord, Service};

pub const CSV_EXTENSION: &str = "csv";
pub const XLSX_EXTENSION: &str = "xlsx";

/// `<entity>-<YYYY-MM-DD>.<extension>`
pub fn export_file_name(entity: &str, day: NaiveDate, extension: &str) -> String {
    format!("{}-{}.{}", entity, day.format("%Y-%m-%d"), extension)
}

/// A named text file ready to be saved or downloaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Spreadsheet cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(u64),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Number(n)
    }
}

/// One worksheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A sheet and the workbook file name it should be saved under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetExport {
    pub file_name: String,
    pub sheet: Sheet,
}

const SERVICE_SHEET_NAME: &str = "Dịch vụ";
const SERVICE_HEADERS: [&str; 5] = ["ID", "Tên dịch vụ", "Mô tả", "Giá", "Phân loại"];

const PATIENT_SHEET_NAME: &str = "Bệnh nhân";
const PATIENT_HEADERS: [&str; 10] = [
    "ID",
    "Họ và tên",
    "Số điện thoại",
    "Địa chỉ",
    "Ghi chú",
    "Ngày khám",
    "Số hóa đơn",
    "Dịch vụ",
    "Tổng tiền",
    "Ngày tạo",
];

fn headers(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|h| h.to_string()).collect()
}

/// Service table as a sheet.
pub fn services_sheet(services: &[Service]) -> Sheet {
    let rows: Vec<Vec<Cell>> = services
        .iter()
        .map(|s| {
            vec![
                s.id.as_str().into(),
                s.name.as_str().into(),
                s.description.as_str().into(),
                s.price.into(),
                s.category.as_str().into(),
            ]
        })
        .collect();

    Sheet {
        name: SERVICE_SHEET_NAME.to_string(),
        headers: headers(&SERVICE_HEADERS),
        rows,
    }
}

/// Patient table as a sheet, timestamps shown in the clinic time zone.
pub fn patients_sheet(records: &[PatientRecord], offset: FixedOffset) -> Sheet {
    let rows: Vec<Vec<Cell>> = records
        .iter()
        .map(|r| {
            vec![
                r.id.as_str().into(),
                r.patient_info.name.as_str().into(),
                r.patient_info.phone.as_str().into(),
                r.patient_info.address.as_str().into(),
                r.patient_info.notes.as_deref().unwrap_or("").into(),
                r.examination_date.as_str().into(),
                r.invoice_number.as_str().into(),
                r.service_names().join(", ").into(),
                r.total_amount().into(),
                format_created_at(r.created_at, offset).into(),
            ]
        })
        .collect();

    Sheet {
        name: PATIENT_SHEET_NAME.to_string(),
        headers: headers(&PATIENT_HEADERS),
        rows,
    }
}

/// `HH:MM:SS DD/MM/YYYY` in the given offset, empty if out of range.
pub fn format_created_at(millis: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&offset).format("%H:%M:%S %d/%m/%Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientInfo;

    fn clinic_offset() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    #[test]
    fn test_export_file_name() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            export_file_name("danh-sach-dich-vu", day, CSV_EXTENSION),
            "danh-sach-dich-vu-2024-01-02.csv"
        );
        assert_eq!(
            export_file_name("danh-sach-benh-nhan", day, XLSX_EXTENSION),
            "danh-sach-benh-nhan-2024-01-02.xlsx"
        );
    }

    #[test]
    fn test_services_sheet() {
        let sheet = services_sheet(&[Service::new("s1", "A", "B", 1_000, "C")]);
        assert_eq!(sheet.name, "Dịch vụ");
        assert_eq!(sheet.headers.len(), 5);
        assert_eq!(sheet.rows[0][3], Cell::Number(1_000));
        assert!(sheet.to_json().unwrap().contains("\"Giá\""));
    }

    #[test]
    fn test_patients_sheet() {
        let record = PatientRecord {
            id: "record-1".into(),
            patient_info: PatientInfo::new("An", "0901234567", "Huế"),
            services: vec![
                Service::new("s1", "Khám", "", 200_000, ""),
                Service::new("s2", "Cạo vôi", "", 500_000, ""),
            ],
            examination_date: "10/05/2024".into(),
            invoice_number: "100524-01".into(),
            created_at: 1_715_310_000_000,
        };

        let sheet = patients_sheet(&[record], clinic_offset());
        let row = &sheet.rows[0];
        assert_eq!(row.len(), sheet.headers.len());
        assert_eq!(row[4], Cell::Text(String::new()));
        assert_eq!(row[7], Cell::Text("Khám, Cạo vôi".into()));
        assert_eq!(row[8], Cell::Number(700_000));
        assert_eq!(row[9], Cell::Text("10:00:00 10/05/2024".into()));
    }
}

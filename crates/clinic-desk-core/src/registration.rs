//! Form validation for visit registration and catalog editing.
//!
//! Validation never raises: it returns a field-keyed map of messages shown
//! next to the offending inputs. An empty map means the form is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::csv::SERVICE_NAME_SEPARATOR;
use crate::models::{PatientInfo, Service};

/// Field name → human-readable message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for a field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Phone numbers are exactly 10 ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Validate the registration form.
pub fn validate_visit(info: &PatientInfo, services: &[Service]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if info.name.trim().is_empty() {
        errors.insert("name", "Vui lòng nhập họ tên");
    }

    let phone = info.phone.trim();
    if phone.is_empty() {
        errors.insert("phone", "Vui lòng nhập số điện thoại");
    } else if !is_valid_phone(phone) {
        errors.insert("phone", "Số điện thoại không hợp lệ");
    }

    if info.address.trim().is_empty() {
        errors.insert("address", "Vui lòng nhập địa chỉ");
    }

    if services.is_empty() {
        errors.insert("services", "Vui lòng chọn ít nhất một dịch vụ");
    }

    errors
}

/// Validate the service editor form.
pub fn validate_service(service: &Service) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if service.name.trim().is_empty() {
        errors.insert("name", "Vui lòng nhập tên dịch vụ");
    } else if service.name.contains(SERVICE_NAME_SEPARATOR) {
        // Visit records list service names joined by the separator.
        errors.insert("name", "Tên dịch vụ không được chứa dấu chấm phẩy (;)");
    }
    if service.description.trim().is_empty() {
        errors.insert("description", "Vui lòng nhập mô tả dịch vụ");
    }
    if service.category.trim().is_empty() {
        errors.insert("category", "Vui lòng nhập phân loại dịch vụ");
    }
    if service.price == 0 {
        errors.insert("price", "Giá dịch vụ phải lớn hơn 0");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> Service {
        Service::new("s1", "Cleaning", "Scale and polish", 500_000, "Hygiene")
    }

    #[test]
    fn test_valid_visit() {
        let info = PatientInfo::new("An", "0901234567", "Huế");
        assert!(validate_visit(&info, &[service()]).is_empty());
    }

    #[test]
    fn test_visit_missing_everything() {
        let errors = validate_visit(&PatientInfo::new(" ", "", ""), &[]);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("name"), Some("Vui lòng nhập họ tên"));
        assert_eq!(errors.get("phone"), Some("Vui lòng nhập số điện thoại"));
        assert_eq!(errors.get("address"), Some("Vui lòng nhập địa chỉ"));
        assert_eq!(errors.get("services"), Some("Vui lòng chọn ít nhất một dịch vụ"));
    }

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("0901234567"));
        assert!(!is_valid_phone("090123456"));
        assert!(!is_valid_phone("09012345678"));
        assert!(!is_valid_phone("090-123-45"));
        assert!(!is_valid_phone("０９０１２３４５６７"));

        let errors = validate_visit(&PatientInfo::new("An", "12345", "Huế"), &[service()]);
        assert_eq!(errors.get("phone"), Some("Số điện thoại không hợp lệ"));
    }

    #[test]
    fn test_phone_is_trimmed() {
        let info = PatientInfo::new("An", " 0901234567 ", "Huế");
        assert!(validate_visit(&info, &[service()]).is_empty());
    }

    #[test]
    fn test_validate_service() {
        assert!(validate_service(&service()).is_empty());

        let errors = validate_service(&Service::new("s2", "", "", 0, ""));
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("price"), Some("Giá dịch vụ phải lớn hơn 0"));
    }

    #[test]
    fn test_service_name_rejects_separator() {
        let mut service = service();
        service.name = "Cạo vôi; đánh bóng".into();

        let errors = validate_service(&service);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("name"),
            Some("Tên dịch vụ không được chứa dấu chấm phẩy (;)")
        );
    }

    #[test]
    fn test_display_and_into_result() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.insert("phone", "bad");
        errors.insert("name", "missing");
        assert_eq!(errors.to_string(), "name: missing; phone: bad");
        assert!(errors.into_result().is_err());
    }
}

//! Billable service catalog models.

use serde::{Deserialize, Serialize};

/// A billable service offered by the clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    /// Unique identifier within the catalog
    pub id: String,
    /// Display name (also the key patient CSVs reference services by)
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Price in VND
    pub price: u64,
    /// Grouping shown in the catalog table
    pub category: String,
}

/// Partial update for a service. `None` fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub category: Option<String>,
}

impl Service {
    /// Create a new service with every field set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: u64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
            category: category.into(),
        }
    }

    /// Placeholder for a service name that no catalog entry matches.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            id: format!("service-{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
            description: String::new(),
            price: 0,
            category: String::new(),
        }
    }

    /// Merge a patch into this service. The id never changes.
    pub fn apply(&mut self, patch: ServicePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }

    /// Case-insensitive substring match over name, description and category.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.category.to_lowercase().contains(&query)
    }
}

/// Catalog bundled with the application, used when the services CSV cannot be loaded.
pub fn default_catalog() -> Vec<Service> {
    vec![
        Service::new(
            "service-1",
            "Khám và tư vấn",
            "Khám tổng quát và tư vấn về tình trạng răng miệng",
            200_000,
            "Khám tổng quát",
        ),
        Service::new(
            "service-2",
            "Cạo vôi răng",
            "Làm sạch cao răng và đánh bóng răng",
            500_000,
            "Vệ sinh răng miệng",
        ),
        Service::new(
            "service-3",
            "Trám răng thẩm mỹ",
            "Trám răng bằng vật liệu composite màu trắng",
            350_000,
            "Phục hồi răng",
        ),
        Service::new(
            "service-4",
            "Nhổ răng đơn giản",
            "Nhổ răng không cần phẫu thuật",
            300_000,
            "Nhổ răng",
        ),
        Service::new(
            "service-5",
            "Nhổ răng khôn",
            "Phẫu thuật nhổ răng khôn",
            1_500_000,
            "Phẫu thuật",
        ),
        Service::new(
            "service-6",
            "Tẩy trắng răng",
            "Làm trắng răng bằng công nghệ hiện đại",
            2_500_000,
            "Thẩm mỹ",
        ),
        Service::new(
            "service-7",
            "Bọc răng sứ",
            "Bọc răng sứ thẩm mỹ cao cấp",
            3_000_000,
            "Thẩm mỹ",
        ),
        Service::new(
            "service-8",
            "Cấy ghép implant",
            "Cấy ghép implant titanium",
            15_000_000,
            "Phẫu thuật",
        ),
        Service::new(
            "service-9",
            "Niềng răng thẩm mỹ",
            "Niềng răng mắc cài kim loại hoặc sứ",
            30_000_000,
            "Chỉnh nha",
        ),
        Service::new(
            "service-10",
            "Điều trị tủy răng",
            "Điều trị tủy răng và trám bít ống tủy",
            1_200_000,
            "Điều trị",
        ),
        Service::new(
            "service-11",
            "Điều trị viêm nha chu",
            "Điều trị viêm nướu và nha chu",
            800_000,
            "Điều trị",
        ),
        Service::new(
            "service-12",
            "Hàm giả tháo lắp",
            "Làm hàm giả tháo lắp một phần hoặc toàn phần",
            5_000_000,
            "Phục hình",
        ),
    ]
}

/// Format an amount in VND with `.` thousands separators, e.g. `1.500.000 ₫`.
pub fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped.push_str(" ₫");
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_patch_keeps_unset_fields() {
        let mut service = Service::new("svc-1", "Cleaning", "Scale and polish", 500_000, "Hygiene");
        service.apply(ServicePatch {
            price: Some(550_000),
            ..Default::default()
        });

        assert_eq!(service.id, "svc-1");
        assert_eq!(service.name, "Cleaning");
        assert_eq!(service.price, 550_000);
        assert_eq!(service.category, "Hygiene");
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let service = Service::new("svc-1", "Tẩy trắng răng", "Whitening", 1, "Thẩm mỹ");
        assert!(service.matches("TẨY"));
        assert!(service.matches("whiten"));
        assert!(service.matches("thẩm"));
        assert!(!service.matches("implant"));
    }

    #[test]
    fn test_placeholder_ids_are_unique() {
        let a = Service::placeholder("Unknown");
        let b = Service::placeholder("Unknown");
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("service-"));
        assert_eq!(a.price, 0);
        assert!(a.description.is_empty());
        assert!(a.category.is_empty());
    }

    #[test]
    fn test_default_catalog() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog[0].id, "service-1");
        assert_eq!(catalog[11].id, "service-12");
        assert!(catalog.iter().all(|s| s.price > 0));
    }

    #[test]
    fn test_format_vnd() {
        assert_eq!(format_vnd(0), "0 ₫");
        assert_eq!(format_vnd(999), "999 ₫");
        assert_eq!(format_vnd(1_000), "1.000 ₫");
        assert_eq!(format_vnd(1_500_000), "1.500.000 ₫");
        assert_eq!(format_vnd(30_000_000), "30.000.000 ₫");
    }
}

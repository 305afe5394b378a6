use serde::{Deserialize, Serialize};

// ============================================================================
// Aggregate Root
// ============================================================================

/// Учётная запись единицы медицинского оборудования.
///
/// `serial_number` уникально идентифицирует запись в хранилище: две записи
/// с одинаковым серийным номером недопустимы. `expiry_date` всегда хранится
/// в каноническом виде `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "model", default)]
    pub model: String,

    #[serde(rename = "serialNumber")]
    pub serial_number: String,

    #[serde(rename = "department", default)]
    pub department: String,

    #[serde(rename = "expiryDate")]
    pub expiry_date: String,

    /// data-URI или внешний URL фотографии, необязательное поле.
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl DeviceRecord {
    /// Case-insensitive substring match across name, model and serial number.
    /// An empty needle matches everything.
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        if needle_lower.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle_lower)
            || self.model.to_lowercase().contains(needle_lower)
            || self.serial_number.to_lowercase().contains(needle_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DeviceRecord {
        DeviceRecord {
            name: "Infusion Pump".to_string(),
            model: "IP-200".to_string(),
            serial_number: "SN-0042".to_string(),
            department: "ICU".to_string(),
            expiry_date: "2027-03-01".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn search_matches_any_of_three_fields() {
        let r = record();
        assert!(r.matches_search("pump"));
        assert!(r.matches_search("ip-2"));
        assert!(r.matches_search("sn-0042"));
        assert!(!r.matches_search("icu")); // department is not searched
        assert!(r.matches_search(""));
    }

    #[test]
    fn serde_uses_camel_case_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("serialNumber").is_some());
        assert!(json.get("expiryDate").is_some());
        // imageUrl is omitted when absent
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn deserialize_tolerates_missing_optional_fields() {
        let r: DeviceRecord = serde_json::from_str(
            r#"{"name":"X","serialNumber":"S1","expiryDate":"2025-01-01"}"#,
        )
        .unwrap();
        assert_eq!(r.model, "");
        assert_eq!(r.department, "");
        assert_eq!(r.image_url, None);
    }
}

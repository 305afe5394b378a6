//! Кодек снимка хранилища.
//!
//! Снимок — полная сериализация всех записей на один момент времени.
//! Успешное декодирование замещает хранилище целиком (не merge), поэтому
//! вызывающая сторона обязана запросить явное подтверждение.

use crate::domain::a001_device::DeviceRecord;
use serde_json::Value;
use thiserror::Error;

/// Порог для визуального QR-канала, в байтах закодированного снимка.
/// Сугубо рекомендательный: файловый перенос ограничений не имеет.
pub const QR_PAYLOAD_MAX_BYTES: usize = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferChannel {
    Qr,
    File,
}

/// Стратегия канала по размеру payload.
pub fn select_channel(payload_bytes: usize) -> TransferChannel {
    if payload_bytes <= QR_PAYLOAD_MAX_BYTES {
        TransferChannel::Qr
    } else {
        TransferChannel::File
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot payload is not a JSON array of device records: {0}")]
    InvalidSnapshotStructure(String),
}

/// Компактный JSON для QR-канала. Поля идут как есть: даты уже
/// нормализованы, data-URI фотографий включаются дословно.
pub fn encode_snapshot(records: &[DeviceRecord]) -> String {
    serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
}

/// Pretty-printed вариант для выгрузки в файл.
pub fn encode_snapshot_pretty(records: &[DeviceRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

fn require_string_field(element: &Value, index: usize, field: &str) -> Result<(), SnapshotError> {
    match element.get(field) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(SnapshotError::InvalidSnapshotStructure(format!(
            "element {} has no string field `{}`",
            index, field
        ))),
    }
}

/// Разобрать снимок. Требования минимальны: JSON-массив, каждый элемент —
/// объект со строковыми `name`, `serialNumber`, `expiryDate`; остальные
/// поля проходят без проверки. При любом нарушении хранилище не меняется.
pub fn decode_snapshot(text: &str) -> Result<Vec<DeviceRecord>, SnapshotError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| SnapshotError::InvalidSnapshotStructure(e.to_string()))?;

    let elements = value
        .as_array()
        .ok_or_else(|| SnapshotError::InvalidSnapshotStructure("not an array".to_string()))?;

    for (i, element) in elements.iter().enumerate() {
        require_string_field(element, i, "name")?;
        require_string_field(element, i, "serialNumber")?;
        require_string_field(element, i, "expiryDate")?;
    }

    serde_json::from_value(value).map_err(|e| SnapshotError::InvalidSnapshotStructure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<DeviceRecord> {
        vec![
            DeviceRecord {
                name: "Ventilator".to_string(),
                model: "V-300".to_string(),
                serial_number: "SN1".to_string(),
                department: "ICU".to_string(),
                expiry_date: "2026-05-01".to_string(),
                image_url: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            },
            DeviceRecord {
                name: "Pump".to_string(),
                model: "P-100".to_string(),
                serial_number: "SN2".to_string(),
                department: "ER".to_string(),
                expiry_date: "2025-12-05".to_string(),
                image_url: None,
            },
        ]
    }

    #[test]
    fn round_trip_is_field_for_field_identity() {
        let original = records();
        let decoded = decode_snapshot(&encode_snapshot(&original)).unwrap();
        assert_eq!(decoded, original);

        let decoded_pretty = decode_snapshot(&encode_snapshot_pretty(&original)).unwrap();
        assert_eq!(decoded_pretty, original);
    }

    #[test]
    fn empty_store_round_trips() {
        assert_eq!(decode_snapshot(&encode_snapshot(&[])).unwrap(), vec![]);
    }

    #[test]
    fn rejects_non_array_payloads() {
        assert!(decode_snapshot("{}").is_err());
        assert!(decode_snapshot("\"text\"").is_err());
        assert!(decode_snapshot("not json at all").is_err());
    }

    #[test]
    fn rejects_elements_without_required_string_fields() {
        // missing serialNumber
        let e = decode_snapshot(r#"[{"name":"X","expiryDate":"2025-01-01"}]"#).unwrap_err();
        assert!(e.to_string().contains("serialNumber"));
        // expiryDate of the wrong type
        assert!(
            decode_snapshot(r#"[{"name":"X","serialNumber":"S","expiryDate":42}]"#).is_err()
        );
        // non-object element
        assert!(decode_snapshot(r#"["just a string"]"#).is_err());
    }

    #[test]
    fn unknown_extra_fields_pass_through_permissively() {
        let decoded = decode_snapshot(
            r#"[{"name":"X","serialNumber":"S","expiryDate":"2025-01-01","vendor":"acme"}]"#,
        )
        .unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].model, "");
    }

    #[test]
    fn channel_gate_is_a_pure_size_check() {
        assert_eq!(select_channel(0), TransferChannel::Qr);
        assert_eq!(select_channel(QR_PAYLOAD_MAX_BYTES), TransferChannel::Qr);
        assert_eq!(select_channel(QR_PAYLOAD_MAX_BYTES + 1), TransferChannel::File);
    }
}

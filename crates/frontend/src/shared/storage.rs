//! Персистентность: весь список записей лежит в localStorage одной
//! JSON-строкой. Читается один раз на старте, перезаписывается целиком
//! после каждой мутации списка.

use contracts::domain::a001_device::DeviceRecord;

const RECORDS_KEY: &str = "biomed_inventory_records";

fn get_local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Загрузка снимка хранилища. Отсутствие ключа или повреждённый JSON дают
/// пустой список: стартовать всё равно надо.
pub fn load_records() -> Vec<DeviceRecord> {
    let Some(json) = get_local_storage().and_then(|s| s.get_item(RECORDS_KEY).ok().flatten())
    else {
        return Vec::new();
    };
    match serde_json::from_str(&json) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("stored records are unreadable, starting empty: {}", e);
            Vec::new()
        }
    }
}

/// Полная перезапись снимка. Ошибка записи (квота, приватный режим)
/// сообщается наверх; состояние в памяти остаётся действительным.
pub fn save_records(records: &[DeviceRecord]) -> Result<(), String> {
    let storage = get_local_storage().ok_or("localStorage is unavailable")?;
    let json =
        serde_json::to_string(records).map_err(|e| format!("serialization failed: {}", e))?;
    storage
        .set_item(RECORDS_KEY, &json)
        .map_err(|e| format!("localStorage write failed: {:?}", e))
}

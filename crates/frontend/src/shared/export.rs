//! Выгрузка данных в файлы: CSV, JSON и готовый PDF-байтовый буфер.
//! Скачивание идёт через Blob и временную ссылку.

use contracts::domain::a001_device::DeviceRecord;
use contracts::shared::{csv, dates};
use contracts::usecases::u501_import_from_csv::REQUIRED_HEADERS;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Заголовок экспортного CSV: `Name,Model,Serial Number,Department,Expiry Date`.
pub fn csv_header() -> String {
    REQUIRED_HEADERS.join(",")
}

/// CSV всего списка: каждое поле в кавычках, внутренние кавычки удвоены,
/// дата годности в виде `DD-MM-YYYY`.
pub fn build_csv(records: &[DeviceRecord]) -> String {
    let mut content = csv_header();
    for r in records {
        content.push('\n');
        let row = [
            csv::escape_field(&r.name),
            csv::escape_field(&r.model),
            csv::escape_field(&r.serial_number),
            csv::escape_field(&r.department),
            csv::escape_field(&dates::to_export_format(&r.expiry_date)),
        ];
        content.push_str(&row.join(","));
    }
    content
}

/// Шаблон импорта: тот же заголовок без строк данных.
pub fn build_csv_template() -> String {
    csv_header()
}

/// Имя файла с отметкой времени, например `inventory-2026-08-23.csv`.
pub fn stamped_filename(prefix: &str, extension: &str) -> String {
    let today = chrono::Utc::now().format("%Y-%m-%d");
    format!("{}-{}.{}", prefix, today, extension)
}

/// Скачивает текстовое содержимое как файл.
pub fn download_text(content: &str, filename: &str, mime: &str) -> Result<(), String> {
    let array = js_sys::Array::new();
    array.push(&wasm_bindgen::JsValue::from_str(content));

    let properties = BlobPropertyBag::new();
    properties.set_type(mime);
    let blob = Blob::new_with_str_sequence_and_options(&array, &properties)
        .map_err(|e| format!("Failed to create blob: {:?}", e))?;

    download_blob(&blob, filename)
}

/// Скачивает бинарное содержимое (PDF) как файл.
pub fn download_bytes(content: &[u8], filename: &str, mime: &str) -> Result<(), String> {
    let array = js_sys::Array::new();
    array.push(&js_sys::Uint8Array::from(content));

    let properties = BlobPropertyBag::new();
    properties.set_type(mime);
    let blob = Blob::new_with_buffer_source_sequence_and_options(&array, &properties)
        .map_err(|e| format!("Failed to create blob: {:?}", e))?;

    download_blob(&blob, filename)
}

/// Инициирует скачивание Blob через временную ссылку в DOM.
fn download_blob(blob: &Blob, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;

    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    document
        .body()
        .ok_or("No body element")?
        .append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;

    anchor.click();

    document
        .body()
        .ok_or("No body element")?
        .remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DeviceRecord {
        DeviceRecord {
            name: "Pump, portable".to_string(),
            model: r#"P "pro" 100"#.to_string(),
            serial_number: "SN1".to_string(),
            department: "ICU".to_string(),
            expiry_date: "2025-12-05".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn csv_has_exact_header_and_quoted_fields() {
        let text = build_csv(&[record()]);
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Name,Model,Serial Number,Department,Expiry Date"
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""Pump, portable","P ""pro"" 100","SN1","ICU","05-12-2025""#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn template_is_header_only() {
        assert_eq!(build_csv_template(), csv_header());
    }

    #[test]
    fn export_feeds_back_into_the_reconciler() {
        use contracts::usecases::u501_import_from_csv::reconcile;
        let store = vec![record()];
        let (merged, outcome) = reconcile(&store, &build_csv(&store)).unwrap();
        assert_eq!(outcome.updated_count, 1);
        assert_eq!(merged, store);
    }

    #[test]
    fn stamped_filename_has_prefix_and_extension() {
        let name = stamped_filename("inventory", "csv");
        assert!(name.starts_with("inventory-"));
        assert!(name.ends_with(".csv"));
    }
}

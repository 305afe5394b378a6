//! PDF-отчёт по текущему отфильтрованному/отсортированному представлению
//! списка: заголовок, отметка времени генерации, табличные строки.

use contracts::domain::a001_device::DeviceRecord;
use contracts::shared::dates;
use printpdf::*;

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 12.0;
const ROW_STEP_MM: f32 = 7.0;

// x-координаты колонок таблицы
const COL_NAME: f32 = MARGIN_MM;
const COL_MODEL: f32 = 62.0;
const COL_SERIAL: f32 = 102.0;
const COL_DEPARTMENT: f32 = 142.0;
const COL_EXPIRY: f32 = 176.0;

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}

/// Собирает PDF в память. Записи идут в том порядке, в котором их отдал
/// `derive_view`, по страницам с повторением шапки таблицы.
pub fn generate_report(records: &[DeviceRecord], title: &str) -> Result<Vec<u8>, String> {
    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| format!("Ошибка добавления шрифта: {:?}", e))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| format!("Ошибка добавления шрифта: {:?}", e))?;

    let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = A4_HEIGHT_MM - MARGIN_MM - 8.0;

    // титульный блок только на первой странице
    layer.use_text(title, 16.0, Mm(MARGIN_MM), Mm(y), &font_bold);
    y -= 6.0;
    layer.use_text(
        format!("Generated: {} — {} device(s)", generated_at, records.len()),
        9.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    y -= 10.0;

    let table_header = |layer: &PdfLayerReference, y: f32| {
        layer.use_text("Name", 10.0, Mm(COL_NAME), Mm(y), &font_bold);
        layer.use_text("Model", 10.0, Mm(COL_MODEL), Mm(y), &font_bold);
        layer.use_text("Serial Number", 10.0, Mm(COL_SERIAL), Mm(y), &font_bold);
        layer.use_text("Department", 10.0, Mm(COL_DEPARTMENT), Mm(y), &font_bold);
        layer.use_text("Expiry Date", 10.0, Mm(COL_EXPIRY), Mm(y), &font_bold);
    };

    table_header(&layer, y);
    y -= ROW_STEP_MM;

    for record in records {
        if y < MARGIN_MM + ROW_STEP_MM {
            let (page, new_layer) = doc.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(new_layer);
            y = A4_HEIGHT_MM - MARGIN_MM - 8.0;
            table_header(&layer, y);
            y -= ROW_STEP_MM;
        }

        layer.use_text(truncate(&record.name, 28), 9.0, Mm(COL_NAME), Mm(y), &font);
        layer.use_text(truncate(&record.model, 22), 9.0, Mm(COL_MODEL), Mm(y), &font);
        layer.use_text(
            truncate(&record.serial_number, 22),
            9.0,
            Mm(COL_SERIAL),
            Mm(y),
            &font,
        );
        layer.use_text(
            truncate(&record.department, 18),
            9.0,
            Mm(COL_DEPARTMENT),
            Mm(y),
            &font,
        );
        layer.use_text(
            dates::to_export_format(&record.expiry_date),
            9.0,
            Mm(COL_EXPIRY),
            Mm(y),
            &font,
        );
        y -= ROW_STEP_MM;
    }

    doc.save_to_bytes()
        .map_err(|e| format!("Ошибка сохранения PDF: {:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: usize) -> DeviceRecord {
        DeviceRecord {
            name: format!("Device {}", i),
            model: "M-1".to_string(),
            serial_number: format!("SN{}", i),
            department: "ICU".to_string(),
            expiry_date: "2026-01-15".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn produces_a_pdf_byte_stream() {
        let records: Vec<_> = (0..3).map(record).collect();
        let bytes = generate_report(&records, "Equipment Report").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_lists_spill_over_to_extra_pages() {
        let few = generate_report(&(0..3).map(record).collect::<Vec<_>>(), "R").unwrap();
        let many = generate_report(&(0..120).map(record).collect::<Vec<_>>(), "R").unwrap();
        assert!(many.len() > few.len());
        assert!(many.starts_with(b"%PDF"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}

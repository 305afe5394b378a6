//! QR-канал переноса снимка: SVG-рендер для показа и камера для чтения.

pub mod scanner;

pub use scanner::CameraScanner;

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

/// Рендерит текст снимка в SVG-разметку QR-кода.
///
/// Уровень коррекции Q (~25% повреждений) — код должен читаться с экрана
/// чужим телефоном при бликах и смазе.
pub fn render_svg(payload: &str) -> Result<String, String> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::Q)
        .map_err(|e| format!("QR encoding failed: {:?}", e))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(260, 260)
        .quiet_zone(true)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_svg_markup() {
        let svg = render_svg(r#"[{"name":"X","serialNumber":"S","expiryDate":"2025-01-01"}]"#)
            .unwrap();
        assert!(svg.starts_with("<?xml") || svg.starts_with("<svg"));
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn payloads_beyond_qr_capacity_fail_cleanly() {
        // even the advisory 2500-byte gate fits in a QR, but a megabyte won't
        let huge = "x".repeat(1_000_000);
        assert!(render_svg(&huge).is_err());
    }
}

//! Чтение выбранных пользователем файлов: как текст (CSV/JSON) и как
//! data-URI (фото устройства).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use wasm_bindgen_futures::JsFuture;

/// Читает файл целиком как UTF-8 текст.
pub async fn read_file_as_text(file: web_sys::File) -> Result<String, String> {
    let text = JsFuture::from(file.text())
        .await
        .map_err(|e| format!("Ошибка чтения файла: {:?}", e))?;
    text.as_string()
        .ok_or_else(|| "Файл не является текстом".to_string())
}

/// Читает файл как `data:<mime>;base64,...` для встраивания фото в запись.
pub async fn read_file_as_data_url(file: web_sys::File) -> Result<String, String> {
    let array_buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Ошибка чтения файла: {:?}", e))?;

    let uint8_array = js_sys::Uint8Array::new(&array_buffer);
    let mut bytes = vec![0; uint8_array.length() as usize];
    uint8_array.copy_to(&mut bytes);

    let mime = if file.type_().is_empty() {
        "application/octet-stream".to_string()
    } else {
        file.type_()
    };
    Ok(format!("data:{};base64,{}", mime, BASE64.encode(&bytes)))
}

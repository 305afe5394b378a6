//! Чтение QR-кода с камеры: getUserMedia → кадр в canvas → rqrr.
//!
//! Одноразовая отменяемая операция: цикл опроса доставляет максимум один
//! результат, отмена останавливает дорожки камеры и выходит без результата.

use gloo_timers::future::TimeoutFuture;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints,
};

const FRAME_INTERVAL_MS: u32 = 250;

#[derive(Clone, Default)]
pub struct CameraScanner {
    stream: Rc<RefCell<Option<MediaStream>>>,
    cancelled: Rc<Cell<bool>>,
}

impl CameraScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Просит отменить текущее сканирование; цикл завершится на следующем
    /// тике и остановит камеру.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Запускает камеру в `video` и крутит цикл распознавания.
    /// `Ok(Some(text))` — код прочитан, `Ok(None)` — пользователь отменил,
    /// `Err` — камера недоступна или кадр не читается.
    pub async fn scan(&self, video: HtmlVideoElement) -> Result<Option<String>, String> {
        self.cancelled.set(false);

        let stream = open_camera().await?;
        video.set_src_object(Some(&stream));
        self.stream.replace(Some(stream));

        let play = video
            .play()
            .map_err(|e| format!("Не удалось запустить видео: {:?}", e))?;
        if JsFuture::from(play).await.is_err() {
            self.stop(&video);
            return Err("Не удалось запустить видео с камеры".to_string());
        }

        loop {
            if self.cancelled.get() {
                self.stop(&video);
                return Ok(None);
            }
            if let Some(text) = try_decode_frame(&video)? {
                self.stop(&video);
                return Ok(Some(text));
            }
            TimeoutFuture::new(FRAME_INTERVAL_MS).await;
        }
    }

    fn stop(&self, video: &HtmlVideoElement) {
        if let Some(stream) = self.stream.borrow_mut().take() {
            let tracks = stream.get_tracks();
            for i in 0..tracks.length() {
                if let Ok(track) = tracks.get(i).dyn_into::<web_sys::MediaStreamTrack>() {
                    track.stop();
                }
            }
        }
        video.set_src_object(None);
    }
}

async fn open_camera() -> Result<MediaStream, String> {
    let window = web_sys::window().ok_or("No window object")?;
    let media_devices = window
        .navigator()
        .media_devices()
        .map_err(|e| format!("Камера недоступна: {:?}", e))?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::TRUE);
    constraints.set_audio(&JsValue::FALSE);

    let promise = media_devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| format!("Камера недоступна: {:?}", e))?;
    let stream = JsFuture::from(promise)
        .await
        .map_err(|e| format!("Доступ к камере не получен: {:?}", e))?;
    stream
        .dyn_into::<MediaStream>()
        .map_err(|e| format!("Неожиданный ответ getUserMedia: {:?}", e))
}

/// Один кадр: видео → canvas → градации серого → rqrr. `Ok(None)` — кадр
/// ещё не готов или кода в нём нет.
fn try_decode_frame(video: &HtmlVideoElement) -> Result<Option<String>, String> {
    let width = video.video_width();
    let height = video.video_height();
    if width == 0 || height == 0 {
        return Ok(None); // камера ещё не отдала первый кадр
    }

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("No document object")?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| format!("{:?}", e))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|e| format!("{:?}", e))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context = canvas
        .get_context("2d")
        .map_err(|e| format!("{:?}", e))?
        .ok_or("No 2d context")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| format!("{:?}", e))?;
    context
        .draw_image_with_html_video_element(video, 0.0, 0.0)
        .map_err(|e| format!("{:?}", e))?;

    let image_data = context
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|e| format!("{:?}", e))?;
    let rgba = image_data.data();

    let w = width as usize;
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, height as usize, |x, y| {
        let i = (y * w + x) * 4;
        let r = rgba[i] as u32;
        let g = rgba[i + 1] as u32;
        let b = rgba[i + 2] as u32;
        ((r * 299 + g * 587 + b * 114) / 1000) as u8
    });

    for grid in prepared.detect_grids() {
        if let Ok((_meta, content)) = grid.decode() {
            return Ok(Some(content));
        }
    }
    Ok(None)
}

use crate::shared::icons::icon;
use crate::shared::qr;
use crate::shared::qr::CameraScanner;
use contracts::domain::a001_device::DeviceRecord;
use contracts::usecases::u502_snapshot_transfer::{
    decode_snapshot, encode_snapshot, select_channel, TransferChannel, QR_PAYLOAD_MAX_BYTES,
};
use leptos::html;
use leptos::prelude::*;
use send_wrapper::SendWrapper;

#[derive(Clone, Copy, PartialEq)]
enum TransferTab {
    Share,
    Scan,
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .map(|w| w.confirm_with_message(message).unwrap_or(false))
        .unwrap_or(false)
}

/// Перенос снимка между устройствами: показать QR-код или прочитать чужой.
///
/// Снимок целиком заменяет локальное хранилище принимающей стороны, поэтому
/// перед заменой запрашивается подтверждение. Большие снимки в QR не лезут —
/// виджет честно отправляет к экспорту JSON.
#[component]
pub fn TransferWidget(
    records: ReadSignal<Vec<DeviceRecord>>,
    on_replace: Callback<Vec<DeviceRecord>>,
    on_close: Callback<()>,
) -> impl IntoView {
    let (tab, set_tab) = signal(TransferTab::Share);
    let (error, set_error) = signal(Option::<String>::None);
    let (scanning, set_scanning) = signal(false);

    let video_ref = NodeRef::<html::Video>::new();
    let scanner = CameraScanner::new();

    // Компактный снимок и решение о канале пересчитываются от хранилища.
    let payload = Memo::new(move |_| encode_snapshot(&records.get()));
    let channel = Memo::new(move |_| select_channel(payload.get().len()));

    let qr_svg = Memo::new(move |_| {
        if channel.get() != TransferChannel::Qr {
            return None;
        }
        match qr::render_svg(&payload.get()) {
            Ok(svg) => Some(svg),
            Err(e) => {
                log::error!("QR render failed: {}", e);
                None
            }
        }
    });

    let scanner_for_start = SendWrapper::new(scanner.clone());
    let start_scan = move |_| {
        let Some(video) = video_ref.get_untracked() else {
            set_error.set(Some("Видеоэлемент ещё не готов".to_string()));
            return;
        };
        set_error.set(None);
        set_scanning.set(true);

        let scanner = scanner_for_start.clone();
        leptos::task::spawn_local(async move {
            let outcome = scanner.scan(video).await;
            set_scanning.set(false);
            let text = match outcome {
                Ok(Some(text)) => text,
                Ok(None) => return, // отменено пользователем
                Err(e) => {
                    set_error.set(Some(e));
                    return;
                }
            };
            match decode_snapshot(&text) {
                Ok(imported) => {
                    if confirm(&format!(
                        "Принят снимок из {} записей. Заменить им все {} текущих?",
                        imported.len(),
                        records.get_untracked().len()
                    )) {
                        on_replace.run(imported);
                        on_close.run(());
                    }
                }
                Err(e) => {
                    log::warn!("scanned payload rejected: {}", e);
                    set_error.set(Some(format!("QR-код не содержит снимка данных: {}", e)));
                }
            }
        });
    };

    let scanner_for_cancel = SendWrapper::new(scanner.clone());
    let cancel_scan = move |_| {
        scanner_for_cancel.cancel();
    };

    // Уход с вкладки или закрытие окна гасит камеру.
    let scanner_for_tab = scanner.clone();
    let switch_tab = move |next: TransferTab| {
        if next != TransferTab::Scan {
            scanner_for_tab.cancel();
        }
        set_error.set(None);
        set_tab.set(next);
    };

    let scanner_for_close = scanner.clone();
    let close = move |_| {
        scanner_for_close.cancel();
        on_close.run(());
    };

    view! {
        <div class="details-container transfer-widget">
            <div class="details-header">
                <h3>"Передача данных"</h3>
                <button class="btn btn--icon" on:click=close>
                    {icon("x")}
                </button>
            </div>

            <div class="transfer-tabs">
                <button
                    class="btn"
                    class:btn--primary=move || tab.get() == TransferTab::Share
                    on:click={
                        let switch_tab = switch_tab.clone();
                        move |_| switch_tab(TransferTab::Share)
                    }
                >
                    {icon("qr")} " Показать код"
                </button>
                <button
                    class="btn"
                    class:btn--primary=move || tab.get() == TransferTab::Scan
                    on:click=move |_| switch_tab(TransferTab::Scan)
                >
                    {icon("camera")} " Сканировать"
                </button>
            </div>

            {move || error.get().map(|e| view! { <div class="error">{e}</div> })}

            {move || match tab.get() {
                TransferTab::Share => view! {
                    <div class="transfer-share">
                        {move || match channel.get() {
                            TransferChannel::Qr => match qr_svg.get() {
                                Some(svg) => view! {
                                    <div class="transfer-share__qr" inner_html=svg></div>
                                    <p class="transfer-share__hint">
                                        "Отсканируйте код вторым устройством на вкладке «Сканировать»."
                                    </p>
                                }.into_any(),
                                None => view! {
                                    <div class="error">"Не удалось построить QR-код"</div>
                                }.into_any(),
                            },
                            TransferChannel::File => view! {
                                <p class="transfer-share__hint">
                                    {format!(
                                        "Снимок занимает {} байт и не помещается в QR-код (предел {}). \
                                         Используйте экспорт JSON и импортируйте файл на втором устройстве.",
                                        payload.get().len(),
                                        QR_PAYLOAD_MAX_BYTES,
                                    )}
                                </p>
                            }.into_any(),
                        }}
                    </div>
                }.into_any(),
                TransferTab::Scan => {
                    let start_scan = start_scan.clone();
                    let cancel_scan = cancel_scan.clone();
                    view! {
                        <div class="transfer-scan">
                            <video
                                node_ref=video_ref
                                class="transfer-scan__video"
                                autoplay=true
                                playsinline=true
                                muted=true
                            ></video>
                            {move || {
                                if scanning.get() {
                                    view! {
                                        <button class="btn btn--danger" on:click=cancel_scan.clone()>
                                            "Остановить"
                                        </button>
                                    }.into_any()
                                } else {
                                    view! {
                                        <button class="btn btn--primary" on:click=start_scan.clone()>
                                            {icon("camera")} " Включить камеру"
                                        </button>
                                    }.into_any()
                                }
                            }}
                        </div>
                    }.into_any()
                }
            }}
        </div>
    }
}

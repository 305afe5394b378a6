use crate::shared::file_reader::read_file_as_text;
use crate::shared::icons::icon;
use contracts::domain::a001_device::DeviceRecord;
use contracts::usecases::u501_import_from_csv::{reconcile, ImportOutcome};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Результат «сухой прогонки» импорта: слитый список и отчёт, ещё не
/// применённые к хранилищу.
#[derive(Clone)]
struct DryRun {
    merged: Vec<DeviceRecord>,
    outcome: ImportOutcome,
}

/// Импорт CSV с предпросмотром: файл → reconcile без мутаций → отчёт →
/// явное применение. Структурная ошибка показывается и ничего не меняет.
#[component]
pub fn CsvImporter(
    records: ReadSignal<Vec<DeviceRecord>>,
    on_apply: Callback<Vec<DeviceRecord>>,
    on_close: Callback<()>,
) -> impl IntoView {
    let (selected_file_name, set_selected_file_name) = signal(Option::<String>::None);
    let (is_loading, set_is_loading) = signal(false);
    let (error, set_error) = signal(Option::<String>::None);
    let (dry_run, set_dry_run) = signal(Option::<DryRun>::None);
    let (applied, set_applied) = signal(false);

    // Обработка выбора файла: читаем и сразу прогоняем reconcile
    let handle_file_select = move |ev: web_sys::Event| {
        let input = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
        let Some(file) = input.and_then(|i| i.files()).and_then(|f| f.get(0)) else {
            return;
        };

        set_selected_file_name.set(Some(file.name()));
        set_error.set(None);
        set_dry_run.set(None);
        set_applied.set(false);
        set_is_loading.set(true);

        leptos::task::spawn_local(async move {
            match read_file_as_text(file).await {
                Ok(text) => match reconcile(&records.get_untracked(), &text) {
                    Ok((merged, outcome)) => {
                        set_dry_run.set(Some(DryRun { merged, outcome }));
                    }
                    Err(e) => {
                        log::warn!("CSV import rejected: {}", e);
                        set_error.set(Some(e.to_string()));
                    }
                },
                Err(e) => set_error.set(Some(e)),
            }
            set_is_loading.set(false);
        });
    };

    let handle_apply = move |_| {
        if let Some(run) = dry_run.get() {
            on_apply.run(run.merged);
            set_applied.set(true);
        }
    };

    view! {
        <div class="details-container csv-importer">
            <div class="details-header">
                <h3>"Импорт из CSV"</h3>
                <button class="btn btn--icon" on:click=move |_| on_close.run(())>
                    {icon("x")}
                </button>
            </div>

            <div class="form-group">
                <label class="btn btn--file">
                    {icon("upload")} " Выбрать файл"
                    <input type="file" accept=".csv,text/csv" style="display: none"
                        on:change=handle_file_select />
                </label>
                {move || selected_file_name.get().map(|name| view! {
                    <span class="file-name">{name}</span>
                })}
            </div>

            {move || is_loading.get().then(|| view! { <div class="loading">"Чтение файла…"</div> })}
            {move || error.get().map(|e| view! { <div class="error">{e}</div> })}

            {move || dry_run.get().map(|run| {
                let skipped = run.outcome.skipped_rows.clone();
                view! {
                    <div class="import-report">
                        <div class="import-report__summary">
                            <span class="badge badge--success">
                                {format!("Добавится: {}", run.outcome.added_count)}
                            </span>
                            <span class="badge badge--primary">
                                {format!("Обновится: {}", run.outcome.updated_count)}
                            </span>
                            <span class="badge badge--warning">
                                {format!("Пропущено: {}", skipped.len())}
                            </span>
                        </div>

                        {(!skipped.is_empty()).then(|| view! {
                            <table class="skipped-table">
                                <thead>
                                    <tr>
                                        <th>"Строка"</th>
                                        <th>"Причина"</th>
                                        <th>"Содержимое"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {skipped.iter().map(|row| view! {
                                        <tr>
                                            <td>{row.row_number}</td>
                                            <td>{row.reason.display_text()}</td>
                                            <td class="raw-row">{row.raw_row_text.clone()}</td>
                                        </tr>
                                    }).collect_view()}
                                </tbody>
                            </table>
                        })}
                    </div>
                }
            })}

            <div class="details-footer">
                {move || {
                    if applied.get() {
                        view! {
                            <span class="badge badge--success">"Импорт применён"</span>
                        }.into_any()
                    } else {
                        view! {
                            <button
                                class="btn btn--primary"
                                disabled=move || dry_run.get().is_none()
                                on:click=handle_apply
                            >
                                "Применить импорт"
                            </button>
                        }.into_any()
                    }
                }}
                <button class="btn" on:click=move |_| on_close.run(())>"Закрыть"</button>
            </div>
        </div>
    }
}

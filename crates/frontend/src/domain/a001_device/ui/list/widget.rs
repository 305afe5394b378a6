use crate::domain::a001_device::ui::details::DeviceDetails;
use crate::domain::a001_device::ui::import::CsvImporter;
use crate::domain::a001_device::ui::transfer::TransferWidget;
use crate::shared::components::PaginationControls;
use crate::shared::export;
use crate::shared::file_reader::read_file_as_text;
use crate::shared::icons::icon;
use crate::shared::pdf;
use crate::shared::storage;
use contracts::domain::a001_device::DeviceRecord;
use contracts::shared::list_view::{derive_view, filter_and_sort, SortDirection, SortKey, ViewState};
use contracts::usecases::u502_snapshot_transfer::decode_snapshot;
use contracts::usecases::u502_snapshot_transfer::encode_snapshot_pretty;
use leptos::prelude::*;
use std::collections::HashSet;
use wasm_bindgen::JsCast;

fn confirm(message: &str) -> bool {
    web_sys::window()
        .map(|w| w.confirm_with_message(message).unwrap_or(false))
        .unwrap_or(false)
}

#[component]
pub fn DeviceList() -> impl IntoView {
    // Снимок хранилища читается один раз на старте сессии.
    let (records, set_records) = signal(storage::load_records());
    let (error, set_error) = signal(Option::<String>::None);

    // Фильтры
    let (filter_input, set_filter_input) = signal(String::new());
    let (filter_text, set_filter_text) = signal(String::new());
    let (selected_departments, set_selected_departments) = signal(HashSet::<String>::new());

    // Сортировка
    let (sort_key, set_sort_key) = signal(SortKey::Name);
    let (sort_direction, set_sort_direction) = signal(SortDirection::Asc);

    // Пагинация (0-индексная, размер страницы фиксирован в contracts)
    let (page, set_page) = signal(0usize);

    // Модальные окна
    let (show_details, set_show_details) = signal(false);
    let (editing_serial, set_editing_serial) = signal(Option::<String>::None);
    let (show_importer, set_show_importer) = signal(false);
    let (show_transfer, set_show_transfer) = signal(false);

    // Каждая мутация списка синхронно переписывает персистентный снимок.
    // При отказе записи состояние в памяти остаётся действительным.
    let commit = Callback::new(move |new_records: Vec<DeviceRecord>| {
        if let Err(e) = storage::save_records(&new_records) {
            log::error!("persist failed: {}", e);
            set_error.set(Some(format!("Не удалось сохранить данные: {}", e)));
        } else {
            set_error.set(None);
        }
        set_records.set(new_records);
    });

    let view_state = move || ViewState {
        search_text: filter_text.get(),
        departments: selected_departments.get(),
        sort_key: sort_key.get(),
        sort_direction: sort_direction.get(),
        page: page.get(),
    };

    let current_page = Memo::new(move |_| derive_view(&records.get(), &view_state()));

    // Варианты фильтра по отделениям — различные значения из хранилища.
    let departments = Memo::new(move |_| {
        let mut values: Vec<String> = records
            .get()
            .iter()
            .map(|r| r.department.clone())
            .filter(|d| !d.is_empty())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        values.sort();
        values
    });

    // Поиск применяется от 3 символов или при очистке; смена текста
    // принудительно возвращает на первую страницу.
    let handle_input_change = move |val: String| {
        set_filter_input.set(val.clone());
        if val.len() >= 3 || val.is_empty() {
            set_filter_text.set(val);
            set_page.set(0);
        }
    };

    let toggle_department = move |dep: String| {
        set_selected_departments.update(|set| {
            if !set.remove(&dep) {
                set.insert(dep);
            }
        });
        set_page.set(0);
    };

    let toggle_sort = move |key: SortKey| {
        if sort_key.get() == key {
            set_sort_direction.set(sort_direction.get().toggled());
        } else {
            set_sort_key.set(key);
            set_sort_direction.set(SortDirection::Asc);
        }
    };

    let sort_marker = move |key: SortKey| {
        if sort_key.get() != key {
            ""
        } else if sort_direction.get() == SortDirection::Asc {
            " ▲"
        } else {
            " ▼"
        }
    };

    let open_add = move |_| {
        set_editing_serial.set(None);
        set_show_details.set(true);
    };

    let delete_device = move |serial: String| {
        if !confirm(&format!("Удалить устройство {}?", serial)) {
            return;
        }
        let remaining: Vec<DeviceRecord> = records
            .get()
            .into_iter()
            .filter(|r| r.serial_number != serial)
            .collect();
        commit.run(remaining);
    };

    let save_device = Callback::new(move |device: DeviceRecord| {
        let mut all = records.get();
        match all
            .iter()
            .position(|r| r.serial_number == device.serial_number)
        {
            Some(pos) => all[pos] = device,
            None => all.push(device),
        }
        commit.run(all);
        set_show_details.set(false);
    });

    // --- экспорт ---

    let export_csv = move |_| {
        let content = export::build_csv(&records.get());
        if let Err(e) = export::download_text(
            &content,
            &export::stamped_filename("inventory", "csv"),
            "text/csv;charset=utf-8;",
        ) {
            set_error.set(Some(e));
        }
    };

    let export_template = move |_| {
        if let Err(e) = export::download_text(
            &export::build_csv_template(),
            "inventory-template.csv",
            "text/csv;charset=utf-8;",
        ) {
            set_error.set(Some(e));
        }
    };

    let export_json = move |_| {
        let content = encode_snapshot_pretty(&records.get());
        if let Err(e) = export::download_text(
            &content,
            &export::stamped_filename("inventory", "json"),
            "application/json",
        ) {
            set_error.set(Some(e));
        }
    };

    // PDF строится по текущему представлению: фильтр и сортировка
    // действуют, пагинация — нет.
    let export_pdf = move |_| {
        let visible = filter_and_sort(&records.get(), &view_state());
        let result = pdf::generate_report(&visible, "Biomedical Equipment Inventory")
            .and_then(|bytes| {
                export::download_bytes(
                    &bytes,
                    &export::stamped_filename("inventory-report", "pdf"),
                    "application/pdf",
                )
            });
        if let Err(e) = result {
            set_error.set(Some(e));
        }
    };

    // --- импорт JSON: полная перезапись хранилища после подтверждения ---

    let handle_json_file = move |ev: web_sys::Event| {
        let input = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
        let Some(input) = input else { return };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        input.set_value(""); // тот же файл можно выбрать повторно

        leptos::task::spawn_local(async move {
            let text = match read_file_as_text(file).await {
                Ok(text) => text,
                Err(e) => {
                    set_error.set(Some(e));
                    return;
                }
            };
            match decode_snapshot(&text) {
                Ok(imported) => {
                    if confirm(&format!(
                        "Импорт JSON заменит все {} текущих записей на {}. Продолжить?",
                        records.get_untracked().len(),
                        imported.len()
                    )) {
                        commit.run(imported);
                        set_page.set(0);
                    }
                }
                Err(e) => {
                    log::warn!("snapshot rejected: {}", e);
                    set_error.set(Some(format!("Файл не является снимком данных: {}", e)));
                }
            }
        });
    };

    view! {
        <div class="device-list">
            {move || error.get().map(|e| view! { <div class="error">{e}</div> })}

            <div class="toolbar">
                <button class="btn btn--primary" on:click=open_add>
                    {icon("plus")} " Добавить устройство"
                </button>
                <button class="btn" on:click=move |_| set_show_importer.set(true)>
                    {icon("upload")} " Импорт CSV"
                </button>
                <label class="btn btn--file">
                    {icon("upload")} " Импорт JSON"
                    <input type="file" accept=".json,application/json" style="display: none"
                        on:change=handle_json_file />
                </label>
                <button class="btn" on:click=export_csv>
                    {icon("download")} " CSV"
                </button>
                <button class="btn" on:click=export_json>
                    {icon("download")} " JSON"
                </button>
                <button class="btn" on:click=export_pdf>
                    {icon("file-text")} " PDF"
                </button>
                <button class="btn" on:click=export_template title="Пустой шаблон для импорта">
                    {icon("download")} " Шаблон"
                </button>
                <button class="btn" on:click=move |_| set_show_transfer.set(true)>
                    {icon("qr")} " Передача"
                </button>
            </div>

            <div class="filter-panel">
                <div class="filter-panel__search">
                    {icon("search")}
                    <input
                        type="text"
                        placeholder="Поиск по названию, модели, серийному номеру"
                        prop:value=move || filter_input.get()
                        on:input=move |ev| handle_input_change(event_target_value(&ev))
                    />
                </div>
                <div class="filter-panel__departments">
                    {icon("filter")}
                    <For
                        each=move || departments.get()
                        key=|dep| dep.clone()
                        children=move |dep: String| {
                            let dep_for_toggle = dep.clone();
                            let dep_for_checked = dep.clone();
                            view! {
                                <label class="department-option">
                                    <input
                                        type="checkbox"
                                        prop:checked=move || {
                                            selected_departments.get().contains(&dep_for_checked)
                                        }
                                        on:change=move |_| toggle_department(dep_for_toggle.clone())
                                    />
                                    {dep.clone()}
                                </label>
                            }
                        }
                    />
                </div>
                <PaginationControls
                    current_page=Signal::derive(move || page.get().min(
                        current_page.get().total_pages.saturating_sub(1),
                    ))
                    total_pages=Signal::derive(move || current_page.get().total_pages)
                    total_count=Signal::derive(move || current_page.get().total_count)
                    on_page_change=Callback::new(move |p: usize| set_page.set(p))
                />
            </div>

            <table class="device-table">
                <thead>
                    <tr>
                        <th>"Фото"</th>
                        <th class="sortable" on:click=move |_| toggle_sort(SortKey::Name)>
                            "Название" {move || sort_marker(SortKey::Name)}
                        </th>
                        <th class="sortable" on:click=move |_| toggle_sort(SortKey::Model)>
                            "Модель" {move || sort_marker(SortKey::Model)}
                        </th>
                        <th class="sortable" on:click=move |_| toggle_sort(SortKey::SerialNumber)>
                            "Серийный номер" {move || sort_marker(SortKey::SerialNumber)}
                        </th>
                        <th class="sortable" on:click=move |_| toggle_sort(SortKey::Department)>
                            "Отделение" {move || sort_marker(SortKey::Department)}
                        </th>
                        <th class="sortable" on:click=move |_| toggle_sort(SortKey::ExpiryDate)>
                            "Годен до" {move || sort_marker(SortKey::ExpiryDate)}
                        </th>
                        <th>"Действия"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || current_page.get().items
                        key=|r| r.serial_number.clone()
                        children=move |record: DeviceRecord| {
                            let serial_for_edit = record.serial_number.clone();
                            let serial_for_delete = record.serial_number.clone();
                            view! {
                                <tr>
                                    <td class="cell-photo">
                                        {match &record.image_url {
                                            Some(url) => view! {
                                                <img class="thumbnail" src=url.clone() alt="device photo" />
                                            }.into_any(),
                                            None => view! { <span class="no-photo">"—"</span> }.into_any(),
                                        }}
                                    </td>
                                    <td>{record.name.clone()}</td>
                                    <td>{record.model.clone()}</td>
                                    <td>{record.serial_number.clone()}</td>
                                    <td>{record.department.clone()}</td>
                                    <td>{contracts::shared::dates::to_export_format(&record.expiry_date)}</td>
                                    <td class="cell-actions">
                                        <button
                                            class="btn btn--icon"
                                            title="Редактировать"
                                            on:click=move |_| {
                                                set_editing_serial.set(Some(serial_for_edit.clone()));
                                                set_show_details.set(true);
                                            }
                                        >
                                            {icon("edit")}
                                        </button>
                                        <button
                                            class="btn btn--icon btn--danger"
                                            title="Удалить"
                                            on:click=move |_| delete_device(serial_for_delete.clone())
                                        >
                                            {icon("trash")}
                                        </button>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>

            {move || (current_page.get().total_count == 0).then(|| view! {
                <div class="empty-state">"Записей нет. Добавьте устройство или импортируйте CSV."</div>
            })}

            {move || show_details.get().then(|| {
                let editing = editing_serial
                    .get()
                    .and_then(|serial| {
                        records.get().into_iter().find(|r| r.serial_number == serial)
                    });
                view! {
                    <div class="modal-overlay">
                        <DeviceDetails
                            device=editing
                            existing_serials=Signal::derive(move || {
                                records.get().iter().map(|r| r.serial_number.clone()).collect::<Vec<_>>()
                            })
                            on_save=save_device
                            on_cancel=Callback::new(move |_| set_show_details.set(false))
                        />
                    </div>
                }
            })}

            {move || show_importer.get().then(|| view! {
                <div class="modal-overlay">
                    <CsvImporter
                        records=records
                        on_apply=Callback::new(move |merged: Vec<DeviceRecord>| {
                            commit.run(merged);
                        })
                        on_close=Callback::new(move |_| set_show_importer.set(false))
                    />
                </div>
            })}

            {move || show_transfer.get().then(|| view! {
                <div class="modal-overlay">
                    <TransferWidget
                        records=records
                        on_replace=Callback::new(move |imported: Vec<DeviceRecord>| {
                            commit.run(imported);
                            set_page.set(0);
                        })
                        on_close=Callback::new(move |_| set_show_transfer.set(false))
                    />
                </div>
            })}
        </div>
    }
}

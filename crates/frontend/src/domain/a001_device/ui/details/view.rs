use crate::shared::file_reader::read_file_as_data_url;
use crate::shared::icons::icon;
use contracts::domain::a001_device::DeviceRecord;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Форма карточки устройства: добавление и редактирование.
///
/// Серийный номер — ключ записи: при редактировании поле заблокировано,
/// при создании проверяется уникальность. Дата — нативный date-input,
/// значение уже в каноническом `YYYY-MM-DD`.
#[component]
pub fn DeviceDetails(
    /// Запись для редактирования; None = новая запись
    device: Option<DeviceRecord>,
    /// Серийные номера, уже занятые в хранилище
    #[prop(into)]
    existing_serials: Signal<Vec<String>>,
    on_save: Callback<DeviceRecord>,
    on_cancel: Callback<()>,
) -> impl IntoView {
    let is_edit = device.is_some();
    let initial = device.unwrap_or(DeviceRecord {
        name: String::new(),
        model: String::new(),
        serial_number: String::new(),
        department: String::new(),
        expiry_date: String::new(),
        image_url: None,
    });

    let form = RwSignal::new(initial);
    let (error, set_error) = signal(Option::<String>::None);

    let handle_photo = move |ev: web_sys::Event| {
        let input = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
        let Some(file) = input.and_then(|i| i.files()).and_then(|f| f.get(0)) else {
            return;
        };
        leptos::task::spawn_local(async move {
            match read_file_as_data_url(file).await {
                Ok(data_url) => form.update(|f| f.image_url = Some(data_url)),
                Err(e) => set_error.set(Some(e)),
            }
        });
    };

    let handle_save = move |_| {
        let candidate = form.get();
        let name = candidate.name.trim().to_string();
        let model = candidate.model.trim().to_string();
        let serial = candidate.serial_number.trim().to_string();
        let department = candidate.department.trim().to_string();

        if name.is_empty()
            || model.is_empty()
            || serial.is_empty()
            || department.is_empty()
            || candidate.expiry_date.is_empty()
        {
            set_error.set(Some("Заполните все обязательные поля".to_string()));
            return;
        }
        if !is_edit && existing_serials.get().contains(&serial) {
            set_error.set(Some(format!(
                "Серийный номер {} уже зарегистрирован",
                serial
            )));
            return;
        }

        on_save.run(DeviceRecord {
            name,
            model,
            serial_number: serial,
            department,
            expiry_date: candidate.expiry_date,
            image_url: candidate.image_url,
        });
    };

    view! {
        <div class="details-container device-details">
            <div class="details-header">
                <h3>{if is_edit { "Редактирование устройства" } else { "Новое устройство" }}</h3>
                <button class="btn btn--icon" on:click=move |_| on_cancel.run(())>
                    {icon("x")}
                </button>
            </div>

            {move || error.get().map(|e| view! { <div class="error">{e}</div> })}

            <div class="details-form">
                <div class="form-group">
                    <label for="device-name">"Название"</label>
                    <input
                        type="text"
                        id="device-name"
                        prop:value=move || form.get().name
                        on:input=move |ev| form.update(|f| f.name = event_target_value(&ev))
                        placeholder="Например: Инфузионный насос"
                    />
                </div>

                <div class="form-group">
                    <label for="device-model">"Модель"</label>
                    <input
                        type="text"
                        id="device-model"
                        prop:value=move || form.get().model
                        on:input=move |ev| form.update(|f| f.model = event_target_value(&ev))
                    />
                </div>

                <div class="form-group">
                    <label for="device-serial">"Серийный номер"</label>
                    <input
                        type="text"
                        id="device-serial"
                        prop:value=move || form.get().serial_number
                        on:input=move |ev| {
                            form.update(|f| f.serial_number = event_target_value(&ev))
                        }
                        disabled=is_edit
                        placeholder="Уникальный ключ записи"
                    />
                </div>

                <div class="form-group">
                    <label for="device-department">"Отделение"</label>
                    <input
                        type="text"
                        id="device-department"
                        prop:value=move || form.get().department
                        on:input=move |ev| form.update(|f| f.department = event_target_value(&ev))
                    />
                </div>

                <div class="form-group">
                    <label for="device-expiry">"Годен до"</label>
                    <input
                        type="date"
                        id="device-expiry"
                        prop:value=move || form.get().expiry_date
                        on:input=move |ev| form.update(|f| f.expiry_date = event_target_value(&ev))
                    />
                </div>

                <div class="form-group">
                    <label for="device-photo">"Фото (необязательно)"</label>
                    <input type="file" id="device-photo" accept="image/*" on:change=handle_photo />
                    {move || form.get().image_url.map(|url| view! {
                        <div class="photo-preview">
                            <img class="thumbnail" src=url alt="preview" />
                            <button
                                class="btn btn--icon"
                                title="Убрать фото"
                                on:click=move |_| form.update(|f| f.image_url = None)
                            >
                                {icon("x")}
                            </button>
                        </div>
                    })}
                </div>
            </div>

            <div class="details-footer">
                <button class="btn btn--primary" on:click=handle_save>"Сохранить"</button>
                <button class="btn" on:click=move |_| on_cancel.run(())>"Отмена"</button>
            </div>
        </div>
    }
}

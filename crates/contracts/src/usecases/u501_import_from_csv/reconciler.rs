//! Построчное слияние CSV-файла с хранилищем (upsert по серийному номеру).
//!
//! Структурные ошибки (пустой файл, отсутствующие колонки) прерывают импорт
//! целиком до каких-либо изменений. Ошибки уровня строки не прерывают пакет:
//! строка пропускается, попадает в `ImportOutcome.skipped_rows` с исходным
//! текстом, обработка продолжается.

use super::outcome::{ImportError, ImportOutcome, SkipReason, SkippedRow};
use crate::domain::a001_device::DeviceRecord;
use crate::shared::{csv, dates};
use std::collections::{HashMap, HashSet};

/// Обязательные колонки заголовка. Сравнение точное с учётом регистра,
/// порядок колонок в файле произвольный, лишние колонки игнорируются.
pub const REQUIRED_HEADERS: [&str; 5] =
    ["Name", "Model", "Serial Number", "Department", "Expiry Date"];

struct Columns {
    name: usize,
    model: usize,
    serial: usize,
    department: usize,
    expiry: usize,
}

fn locate_columns(header_line: &str) -> Result<Columns, ImportError> {
    // Excel сохраняет CSV с BOM; он не часть имени первой колонки
    let header_line = header_line.trim_start_matches('\u{feff}');
    let cells: Vec<String> = csv::split_line(header_line)
        .iter()
        .map(|c| c.trim().to_string())
        .collect();

    let position = |title: &str| cells.iter().position(|c| c == title);

    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|h| position(h).is_none())
        .map(|h| h.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingRequiredHeaders(missing));
    }

    Ok(Columns {
        name: position("Name").unwrap_or(0),
        model: position("Model").unwrap_or(0),
        serial: position("Serial Number").unwrap_or(0),
        department: position("Department").unwrap_or(0),
        expiry: position("Expiry Date").unwrap_or(0),
    })
}

/// Слить `csv_text` в копию `existing`. Существующие записи, которых файл
/// не касается, проходят насквозь без изменений; ничего не удаляется.
pub fn reconcile(
    existing: &[DeviceRecord],
    csv_text: &str,
) -> Result<(Vec<DeviceRecord>, ImportOutcome), ImportError> {
    // Пустые строки отбрасываются до обработки и не считаются строками:
    // номер строки — позиция среди непустых строк, заголовок = строка 1.
    let lines: Vec<&str> = csv_text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(ImportError::EmptyOrHeaderOnlyInput);
    }

    let columns = locate_columns(lines[0])?;

    let mut merged: Vec<DeviceRecord> = existing.to_vec();
    let mut by_serial: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, r)| (r.serial_number.clone(), i))
        .collect();
    let mut seen_in_file: HashSet<String> = HashSet::new();
    let mut outcome = ImportOutcome::default();

    for (i, line) in lines.iter().enumerate().skip(1) {
        let row_number = i + 1;
        let cells = csv::split_line(line);
        let field = |col: usize| cells.get(col).map(|s| s.trim()).unwrap_or("").to_string();

        let skip = |reason: SkipReason, outcome: &mut ImportOutcome| {
            outcome.skipped_rows.push(SkippedRow {
                row_number,
                reason,
                raw_row_text: line.to_string(),
            });
        };

        let serial = field(columns.serial);
        if serial.is_empty() {
            skip(SkipReason::MissingSerialNumber, &mut outcome);
            continue;
        }

        // Дубликат в пределах этого же файла: до любой валидации даты.
        if !seen_in_file.insert(serial.clone()) {
            skip(SkipReason::DuplicateInFile, &mut outcome);
            continue;
        }

        let name = field(columns.name);
        let model = field(columns.model);
        let department = field(columns.department);
        let expiry_text = field(columns.expiry);
        // None = дата не указана, Some(None) = указана, но не распарсилась
        let parsed_expiry = if expiry_text.is_empty() {
            None
        } else {
            Some(dates::parse_import_date(&expiry_text))
        };

        match by_serial.get(&serial).copied() {
            // Новая запись: обязательны имя, модель, отделение и валидная
            // дата. Присутствующая, но невалидная дата всегда даёт
            // InvalidDateFormat — проверка "missing" видит только пустые
            // поля, не присутствующие-но-негодные.
            None => match parsed_expiry {
                Some(None) => skip(SkipReason::InvalidDateFormat, &mut outcome),
                None => skip(SkipReason::MissingRequiredFieldsForNewDevice, &mut outcome),
                Some(Some(date)) => {
                    if name.is_empty() || model.is_empty() || department.is_empty() {
                        skip(SkipReason::MissingRequiredFieldsForNewDevice, &mut outcome);
                    } else {
                        by_serial.insert(serial.clone(), merged.len());
                        merged.push(DeviceRecord {
                            name,
                            model,
                            serial_number: serial,
                            department,
                            expiry_date: dates::normalize(date),
                            image_url: None,
                        });
                        outcome.added_count += 1;
                    }
                }
            },
            // Существующая запись: поля — необязательные переопределения,
            // серийный номер неизменяем. Невалидная указанная дата
            // пропускает строку целиком, запись остаётся нетронутой.
            Some(pos) => {
                if let Some(None) = parsed_expiry {
                    skip(SkipReason::InvalidDateFormat, &mut outcome);
                    continue;
                }
                let record = &mut merged[pos];
                if !name.is_empty() {
                    record.name = name;
                }
                if !model.is_empty() {
                    record.model = model;
                }
                if !department.is_empty() {
                    record.department = department;
                }
                if let Some(Some(date)) = parsed_expiry {
                    record.expiry_date = dates::normalize(date);
                }
                outcome.updated_count += 1;
            }
        }
    }

    Ok((merged, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Name,Model,Serial Number,Department,Expiry Date";

    fn existing(serial: &str) -> DeviceRecord {
        DeviceRecord {
            name: "Old Name".to_string(),
            model: "Old Model".to_string(),
            serial_number: serial.to_string(),
            department: "Old Dept".to_string(),
            expiry_date: "2024-06-15".to_string(),
            image_url: Some("data:image/png;base64,AAAA".to_string()),
        }
    }

    fn csv(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn empty_and_header_only_inputs_fail_structurally() {
        assert_eq!(
            reconcile(&[], "").unwrap_err(),
            ImportError::EmptyOrHeaderOnlyInput
        );
        assert_eq!(
            reconcile(&[], HEADER).unwrap_err(),
            ImportError::EmptyOrHeaderOnlyInput
        );
        // blank lines do not count as data rows
        let text = format!("{}\n\n   \n", HEADER);
        assert_eq!(
            reconcile(&[], &text).unwrap_err(),
            ImportError::EmptyOrHeaderOnlyInput
        );
    }

    #[test]
    fn missing_headers_are_named() {
        let err = reconcile(&[], "Name,Serial Number\nx,y").unwrap_err();
        assert_eq!(
            err,
            ImportError::MissingRequiredHeaders(vec![
                "Model".to_string(),
                "Department".to_string(),
                "Expiry Date".to_string(),
            ])
        );
    }

    #[test]
    fn leading_bom_is_not_part_of_the_first_header() {
        let text = format!("\u{feff}{}\nPump,P100,SN1,ICU,05-12-2025", HEADER);
        let (_, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(outcome.added_count, 1);
    }

    #[test]
    fn header_match_is_case_sensitive() {
        let err = reconcile(&[], "name,Model,Serial Number,Department,Expiry Date\nx").unwrap_err();
        assert!(matches!(err, ImportError::MissingRequiredHeaders(m) if m == vec!["Name"]));
    }

    #[test]
    fn header_order_is_free_and_extra_columns_are_ignored() {
        let text = "Expiry Date,Serial Number,Name,Notes,Department,Model\n\
                    01-01-2030,SN1,Pump,ignored,ICU,P100";
        let (merged, outcome) = reconcile(&[], text).unwrap();
        assert_eq!(outcome.added_count, 1);
        assert_eq!(merged[0].serial_number, "SN1");
        assert_eq!(merged[0].name, "Pump");
        assert_eq!(merged[0].expiry_date, "2030-01-01");
    }

    #[test]
    fn adds_a_valid_new_device() {
        let text = csv(&["Pump,P100,SN1,ICU,05-12-2025"]);
        let (merged, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(outcome.added_count, 1);
        assert_eq!(outcome.updated_count, 0);
        assert!(outcome.skipped_rows.is_empty());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].expiry_date, "2025-12-05");
        assert_eq!(merged[0].image_url, None);
    }

    // Пример из спецификации: вторая строка с тем же серийником в том же
    // файле отбрасывается независимо от собственной валидности.
    #[test]
    fn duplicate_in_file_skips_all_but_first() {
        let text = csv(&[
            "Pump,P100,SN1,ICU,05-12-2025",
            "Pump,P100,SN1,ICU,06-12-2025",
        ]);
        let (merged, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(outcome.added_count, 1);
        assert_eq!(outcome.skipped_rows.len(), 1);
        assert_eq!(outcome.skipped_rows[0].row_number, 3);
        assert_eq!(outcome.skipped_rows[0].reason, SkipReason::DuplicateInFile);
        assert_eq!(merged[0].expiry_date, "2025-12-05"); // first occurrence won
    }

    #[test]
    fn duplicate_skip_never_reaches_date_validation() {
        let text = csv(&[
            "Pump,P100,SN1,ICU,05-12-2025",
            "Pump,P100,SN1,ICU,99-99-9999",
        ]);
        let (_, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(outcome.skipped_rows[0].reason, SkipReason::DuplicateInFile);
    }

    #[test]
    fn blank_name_on_new_device_is_missing_required_fields() {
        let text = csv(&[",M1,SN2,ER,01-01-2030"]);
        let (merged, outcome) = reconcile(&[], &text).unwrap();
        assert!(merged.is_empty());
        assert_eq!(
            outcome.skipped_rows[0].reason,
            SkipReason::MissingRequiredFieldsForNewDevice
        );
    }

    #[test]
    fn blank_expiry_on_new_device_is_missing_required_fields() {
        let text = csv(&["N1,M1,SN2,ER,"]);
        let (_, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(
            outcome.skipped_rows[0].reason,
            SkipReason::MissingRequiredFieldsForNewDevice
        );
    }

    #[test]
    fn invalid_calendar_date_on_new_device_is_invalid_date_format() {
        let text = csv(&["N1,M1,SN3,ER,31-04-2025"]);
        let (_, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(outcome.skipped_rows[0].reason, SkipReason::InvalidDateFormat);
    }

    // Присутствующая, но негодная дата побеждает проверку пустых полей,
    // даже когда имя/модель/отделение тоже пустые.
    #[test]
    fn invalid_present_date_wins_over_blank_fields_for_new_serial() {
        let text = csv(&[",,SN4,,not-a-date"]);
        let (_, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(outcome.skipped_rows[0].reason, SkipReason::InvalidDateFormat);
    }

    #[test]
    fn missing_serial_number_is_skipped() {
        let text = csv(&["N1,M1,,ER,01-01-2030"]);
        let (_, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(
            outcome.skipped_rows[0].reason,
            SkipReason::MissingSerialNumber
        );
    }

    #[test]
    fn existing_record_gets_partial_overrides() {
        let store = vec![existing("SN1")];
        // only model and date supplied; name/department stay
        let text = csv(&[",New Model,SN1,,10/07/2026"]);
        let (merged, outcome) = reconcile(&store, &text).unwrap();
        assert_eq!(outcome.updated_count, 1);
        assert_eq!(outcome.added_count, 0);
        let r = &merged[0];
        assert_eq!(r.name, "Old Name");
        assert_eq!(r.model, "New Model");
        assert_eq!(r.department, "Old Dept");
        assert_eq!(r.expiry_date, "2026-07-10");
        // фото не участвует в CSV и сохраняется
        assert!(r.image_url.is_some());
    }

    #[test]
    fn serial_only_row_against_existing_counts_as_update() {
        let store = vec![existing("SN1")];
        let text = csv(&[",,SN1,,"]);
        let (merged, outcome) = reconcile(&store, &text).unwrap();
        assert_eq!(outcome.updated_count, 1);
        assert_eq!(merged[0], store[0]);
    }

    // Открытый вопрос спецификации решён буквально: негодная дата на
    // обновлении пропускает строку целиком, остальные поля не применяются.
    #[test]
    fn invalid_date_on_existing_row_leaves_record_untouched() {
        let store = vec![existing("SN1")];
        let text = csv(&["New Name,New Model,SN1,New Dept,31-02-2026"]);
        let (merged, outcome) = reconcile(&store, &text).unwrap();
        assert_eq!(outcome.updated_count, 0);
        assert_eq!(outcome.skipped_rows[0].reason, SkipReason::InvalidDateFormat);
        assert_eq!(merged[0], store[0]);
    }

    #[test]
    fn untouched_existing_records_pass_through() {
        let store = vec![existing("SN1"), existing("SN2")];
        let text = csv(&["Pump,P100,SN9,ICU,05-12-2025"]);
        let (merged, _) = reconcile(&store, &text).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], store[0]);
        assert_eq!(merged[1], store[1]);
    }

    #[test]
    fn quoted_fields_with_commas_and_escaped_quotes() {
        let text = csv(&[r#""Pump, portable","P ""pro"" 100",SN1,ICU,05-12-2025"#]);
        let (merged, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(outcome.added_count, 1);
        assert_eq!(merged[0].name, "Pump, portable");
        assert_eq!(merged[0].model, r#"P "pro" 100"#);
    }

    #[test]
    fn blank_lines_do_not_shift_row_numbers() {
        let text = format!(
            "{}\n\nPump,P100,SN1,ICU,05-12-2025\n\n\nBad,B1,,ER,01-01-2030\n",
            HEADER
        );
        let (_, outcome) = reconcile(&[], &text).unwrap();
        // second non-blank data line is row 3
        assert_eq!(outcome.skipped_rows[0].row_number, 3);
    }

    #[test]
    fn skipped_rows_preserve_raw_text_and_order() {
        let text = csv(&[
            "N1,M1,,ER,01-01-2030",
            "Pump,P100,SN1,ICU,05-12-2025",
            "N1,M1,SN1,ER,01-01-2030",
        ]);
        let (_, outcome) = reconcile(&[], &text).unwrap();
        assert_eq!(outcome.skipped_rows.len(), 2);
        assert_eq!(outcome.skipped_rows[0].raw_row_text, "N1,M1,,ER,01-01-2030");
        assert_eq!(outcome.skipped_rows[0].row_number, 2);
        assert_eq!(outcome.skipped_rows[1].row_number, 4);
    }

    // Инвариант: added + updated + skipped == число непустых строк данных.
    #[test]
    fn counts_add_up_to_data_row_count() {
        let store = vec![existing("SN1")];
        let rows = [
            "Pump,P100,SN2,ICU,05-12-2025",  // added
            ",New Model,SN1,,",              // updated
            "N,M,SN3,ER,31-04-2025",         // InvalidDateFormat
            ",M,SN4,ER,01-01-2030",          // MissingRequiredFields
            "N,M,,ER,01-01-2030",            // MissingSerialNumber
            "Pump,P100,SN2,ICU,06-12-2025",  // DuplicateInFile
        ];
        let text = csv(&rows);
        let (_, outcome) = reconcile(&store, &text).unwrap();
        assert_eq!(
            outcome.added_count + outcome.updated_count + outcome.skipped_rows.len(),
            rows.len()
        );
        assert_eq!(outcome.added_count, 1);
        assert_eq!(outcome.updated_count, 1);
    }

    // CSV round trip: экспорт текущего хранилища и повторный импорт дают
    // те же нормализованные даты.
    #[test]
    fn csv_round_trip_keeps_dates_identical() {
        use crate::shared::{csv as csv_mod, dates};

        let store = vec![existing("SN1"), {
            let mut r = existing("SN2");
            r.expiry_date = "2028-02-29".to_string();
            r
        }];

        // denormalize the way the exporter does
        let mut text = HEADER.to_string();
        for r in &store {
            text.push('\n');
            text.push_str(
                &[
                    csv_mod::escape_field(&r.name),
                    csv_mod::escape_field(&r.model),
                    csv_mod::escape_field(&r.serial_number),
                    csv_mod::escape_field(&r.department),
                    csv_mod::escape_field(&dates::to_export_format(&r.expiry_date)),
                ]
                .join(","),
            );
        }

        let (merged, outcome) = reconcile(&store, &text).unwrap();
        assert_eq!(outcome.updated_count, store.len());
        for (before, after) in store.iter().zip(&merged) {
            assert_eq!(before.expiry_date, after.expiry_date);
        }
    }
}

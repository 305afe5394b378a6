use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Структурная ошибка всего импорта: хранилище не меняется вообще.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("CSV file must contain a header line and at least one data row")]
    EmptyOrHeaderOnlyInput,

    #[error("CSV header is missing required columns: {}", .0.join(", "))]
    MissingRequiredHeaders(Vec<String>),
}

/// Диагностический тег отброшенной строки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingSerialNumber,
    DuplicateInFile,
    InvalidDateFormat,
    MissingRequiredFieldsForNewDevice,
}

impl SkipReason {
    pub fn display_text(&self) -> &'static str {
        match self {
            SkipReason::MissingSerialNumber => "Serial number is empty",
            SkipReason::DuplicateInFile => "Serial number already seen earlier in this file",
            SkipReason::InvalidDateFormat => "Expiry date is not a valid DD-MM-YYYY / DD/MM/YYYY date",
            SkipReason::MissingRequiredFieldsForNewDevice => {
                "New device is missing required fields (name, model, department, expiry date)"
            }
        }
    }
}

/// Одна отброшенная строка. Номер строки 1-based, заголовок = строка 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    #[serde(rename = "rowNumber")]
    pub row_number: usize,
    pub reason: SkipReason,
    #[serde(rename = "rawRowText")]
    pub raw_row_text: String,
}

/// Итог одного импорта. Каждая принятая строка увеличивает ровно один из
/// двух счётчиков; порядок skipped_rows повторяет порядок файла.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    #[serde(rename = "addedCount")]
    pub added_count: usize,
    #[serde(rename = "updatedCount")]
    pub updated_count: usize,
    #[serde(rename = "skippedRows")]
    pub skipped_rows: Vec<SkippedRow>,
}

pub mod outcome;
pub mod reconciler;

pub use outcome::{ImportError, ImportOutcome, SkipReason, SkippedRow};
pub use reconciler::{reconcile, REQUIRED_HEADERS};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportFromCsv;

impl UseCaseMetadata for ImportFromCsv {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "import_from_csv"
    }

    fn display_name() -> &'static str {
        "Импорт оборудования из CSV"
    }

    fn description() -> &'static str {
        "Построчное слияние CSV-файла с хранилищем по серийному номеру (upsert)"
    }
}

mod widget;

pub use widget::CsvImporter;

pub mod common;
pub mod u501_import_from_csv;
pub mod u502_snapshot_transfer;

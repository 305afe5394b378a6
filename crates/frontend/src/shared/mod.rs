pub mod components;
pub mod export;
pub mod file_reader;
pub mod icons;
pub mod pdf;
pub mod qr;
pub mod storage;

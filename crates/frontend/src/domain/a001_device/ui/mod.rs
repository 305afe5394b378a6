pub mod details;
pub mod import;
pub mod list;
pub mod transfer;

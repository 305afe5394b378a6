pub mod csv;
pub mod dates;
pub mod list_view;

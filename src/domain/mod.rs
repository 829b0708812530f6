pub mod column_mapping;
pub mod error;
pub mod import_session;
pub mod import_settings;
pub mod question;

// Raw upload tables and rows
pub mod csv;

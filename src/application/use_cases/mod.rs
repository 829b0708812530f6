pub mod csv_import;
pub mod question_bank;
pub mod question_extractor;

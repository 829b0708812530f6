// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Upload decoding, header detection, and row splitting

mod csv_parser;

pub use csv_parser::CsvParser;

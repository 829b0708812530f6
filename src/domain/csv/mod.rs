// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Raw upload tables and normalized rows for question import
// No I/O, no async

mod csv_row;
mod raw_table;

pub use csv_row::CsvRow;
pub use raw_table::{Delimiter, RawTable};

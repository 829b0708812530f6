// ============================================================
// CSV ROW
// ============================================================
// A data line after header zipping

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single data row keyed by header name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsvRow {
    /// Position among non-empty lines, the header line being 0
    pub index: usize,

    /// Trimmed cell values. Headers past the end of a short row are absent.
    pub values: HashMap<String, String>,
}

impl CsvRow {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            values: HashMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Number of cells present, at most the header count.
    pub fn cell_count(&self) -> usize {
        self.values.len()
    }
}

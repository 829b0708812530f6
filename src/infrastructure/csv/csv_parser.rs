// ============================================================
// CSV PARSER
// ============================================================
// Header detection and naive row splitting for question uploads

use csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use encoding_rs::UTF_8;
use tracing::debug;

use crate::domain::csv::{CsvRow, Delimiter, RawTable};
use crate::domain::error::{AppError, Result};

/// Naive single-character CSV splitter.
/// Quotes are ordinary characters, so a delimiter inside a field shifts
/// the remaining columns.
pub struct CsvParser {
    delimiter: Delimiter,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
        }
    }
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Semicolon wins over tab, tab over comma.
    pub fn detect_delimiter(first_line: &str) -> Delimiter {
        if first_line.contains(';') {
            Delimiter::Semicolon
        } else if first_line.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }

    /// Reads delimiter and headers from the text before the first `\n`.
    /// Never fails: an empty first line gives a single empty header.
    pub fn read_table(text: String) -> RawTable {
        let first_line = text.split('\n').next().unwrap_or_default();
        let delimiter = Self::detect_delimiter(first_line);
        let headers = first_line
            .split(delimiter.as_char())
            .map(|header| header.trim().to_string())
            .collect::<Vec<_>>();

        debug!(
            delimiter = %delimiter,
            header_count = headers.len(),
            "Detected CSV headers"
        );

        RawTable {
            text,
            delimiter,
            headers,
        }
    }

    /// Splits every non-empty line after the header and zips it with `headers`.
    pub fn parse_rows(&self, text: &str, headers: &[String]) -> Result<Vec<CsvRow>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter.as_byte())
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .trim(Trim::None)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        let mut index = 0;

        for result in reader.records() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to split CSV line {}: {}", index + 1, e))
            })?;

            if self.is_blank(&record) {
                continue;
            }

            // The first non-empty line is the header row.
            if index > 0 {
                rows.push(Self::zip_row(index, headers, &record));
            }
            index += 1;
        }

        Ok(rows)
    }

    /// True when the whole line is whitespace. A whitespace delimiter
    /// (tab) can itself make up a blank line.
    fn is_blank(&self, record: &StringRecord) -> bool {
        record.iter().all(|field| field.trim().is_empty())
            && (record.len() <= 1 || self.delimiter.as_char().is_whitespace())
    }

    fn zip_row(index: usize, headers: &[String], record: &StringRecord) -> CsvRow {
        let mut row = CsvRow::new(index);
        for (header, value) in headers.iter().zip(record.iter()) {
            row.values.insert(header.clone(), value.trim().to_string());
        }
        row
    }

    /// Decodes an uploaded file as UTF-8, dropping a leading BOM.
    pub fn decode_upload(bytes: &[u8]) -> Result<String> {
        let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
        if had_errors {
            return Err(AppError::IoError(
                "Failed to read the file: content is not valid UTF-8 text".to_string(),
            ));
        }
        Ok(text.into_owned())
    }
}

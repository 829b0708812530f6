// ============================================================
// RAW TABLE
// ============================================================
// Uploaded CSV text plus the delimiter and headers read from its first line

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field separator picked from the header line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delimiter {
    #[serde(rename = ",")]
    Comma,
    #[serde(rename = ";")]
    Semicolon,
    #[serde(rename = "\t")]
    Tab,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
        }
    }

    pub fn as_byte(&self) -> u8 {
        self.as_char() as u8
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::Comma
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Semicolon => write!(f, "semicolon"),
            Delimiter::Tab => write!(f, "tab"),
        }
    }
}

/// One uploaded file, alive for the duration of a single import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    /// Full decoded file content
    pub text: String,

    /// Delimiter detected from the first line
    pub delimiter: Delimiter,

    /// Trimmed header names, in column order
    pub headers: Vec<String>,
}

impl RawTable {
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|header| header == name)
    }
}

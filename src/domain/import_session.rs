use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::column_mapping::ColumnMapping;
use crate::domain::csv::{Delimiter, RawTable};
use crate::domain::question::{DifficultyLevel, Question};

/// Import flow stage: `Idle -> HeadersDetected -> ColumnsMapped -> Previewed -> Saved`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportState {
    Idle,
    HeadersDetected,
    ColumnsMapped,
    Previewed,
    Saved,
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::HeadersDetected => write!(f, "headersDetected"),
            Self::ColumnsMapped => write!(f, "columnsMapped"),
            Self::Previewed => write!(f, "previewed"),
            Self::Saved => write!(f, "saved"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportSession {
    pub id: String,
    pub state: ImportState,
    pub table: Option<RawTable>,
    pub mapping: Option<ColumnMapping>,
    pub questions: Vec<Question>,
    pub created_at: i64,
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: ImportState::Idle,
            table: None,
            mapping: None,
            questions: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Drops everything captured so far, keeping the session id.
    pub fn reset(&mut self) {
        self.state = ImportState::Idle;
        self.table = None;
        self.mapping = None;
        self.questions.clear();
    }

    pub fn summary(&self) -> ImportSessionSummary {
        ImportSessionSummary {
            session_id: self.id.clone(),
            state: self.state,
            delimiter: self.table.as_ref().map(|table| table.delimiter),
            headers: self
                .table
                .as_ref()
                .map(|table| table.headers.clone())
                .unwrap_or_default(),
            mapping: self.mapping.clone(),
            question_count: self.questions.len(),
            created_at: self.created_at,
        }
    }
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSessionSummary {
    pub session_id: String,
    pub state: ImportState,
    pub delimiter: Option<Delimiter>,
    pub headers: Vec<String>,
    pub mapping: Option<ColumnMapping>,
    pub question_count: usize,
    /// Session creation time, unix millis
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub session_id: String,
    pub state: ImportState,
    /// Number of valid questions parsed from the whole file
    pub total: usize,
    /// Leading questions, at most the configured preview limit
    pub preview: Vec<Question>,
    pub message: String,
}

impl ImportPreview {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub session_id: String,
    pub state: ImportState,
    pub level: DifficultyLevel,
    pub saved: usize,
    pub level_size: usize,
    pub message: String,
}

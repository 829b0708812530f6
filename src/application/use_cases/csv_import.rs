// ============================================================
// CSV IMPORT USE CASE
// ============================================================
// Walk an import session from uploaded text to saved questions

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::use_cases::question_bank::QuestionBankUseCase;
use crate::application::use_cases::question_extractor::extract_question;
use crate::domain::column_mapping::ColumnMapping;
use crate::domain::csv::RawTable;
use crate::domain::error::{AppError, Result};
use crate::domain::import_session::{
    ImportPreview, ImportSession, ImportSessionSummary, ImportState, SaveOutcome,
};
use crate::domain::import_settings::{ImportSettings, OptionLettering};
use crate::domain::question::{DifficultyLevel, Question};
use crate::infrastructure::csv::CsvParser;

/// Parses every valid question out of `text` in one pass.
/// Invalid rows are skipped; an empty result is not an error.
pub fn parse_questions_from_csv(
    text: &str,
    mapping: &ColumnMapping,
    lettering: OptionLettering,
) -> Result<Vec<Question>> {
    let table = CsvParser::read_table(text.to_string());
    parse_table(&table, mapping, lettering)
}

fn parse_table(
    table: &RawTable,
    mapping: &ColumnMapping,
    lettering: OptionLettering,
) -> Result<Vec<Question>> {
    let rows = CsvParser::new()
        .with_delimiter(table.delimiter)
        .parse_rows(&table.text, &table.headers)?;

    let row_count = rows.len();
    let questions: Vec<Question> = rows
        .iter()
        .filter_map(|row| extract_question(row, mapping, lettering))
        .collect();

    debug!(
        rows = row_count,
        questions = questions.len(),
        dropped = row_count - questions.len(),
        "Parsed CSV rows"
    );
    Ok(questions)
}

pub struct CsvImportUseCase {
    settings: ImportSettings,
    bank: Arc<QuestionBankUseCase>,
}

impl CsvImportUseCase {
    pub fn new(settings: ImportSettings, bank: Arc<QuestionBankUseCase>) -> Self {
        Self { settings, bank }
    }

    /// Decodes an upload and detects its headers.
    /// A read failure leaves the session idle.
    pub fn load_upload(
        &self,
        session: &mut ImportSession,
        bytes: &[u8],
    ) -> Result<ImportSessionSummary> {
        match CsvParser::decode_upload(bytes) {
            Ok(text) => Ok(self.load_text(session, text)),
            Err(err) => {
                warn!(session_id = %session.id, error = %err, "Failed to read upload");
                session.reset();
                Err(err)
            }
        }
    }

    /// Any previous mapping or parse result is discarded.
    pub fn load_text(&self, session: &mut ImportSession, text: String) -> ImportSessionSummary {
        let table = CsvParser::read_table(text);
        info!(
            session_id = %session.id,
            delimiter = %table.delimiter,
            headers = ?table.headers,
            "Upload loaded"
        );

        session.reset();
        session.table = Some(table);
        session.state = ImportState::HeadersDetected;
        session.summary()
    }

    /// Locks in the column mapping and builds the preview.
    /// The mapping cannot be changed afterwards without loading the file again.
    pub fn complete_mapping(
        &self,
        session: &mut ImportSession,
        mapping: ColumnMapping,
    ) -> Result<ImportPreview> {
        if session.state != ImportState::HeadersDetected {
            return Err(AppError::ValidationError(format!(
                "Column mapping can only be set right after loading a file (session is {})",
                session.state
            )));
        }
        let table = session
            .table
            .as_ref()
            .ok_or_else(|| AppError::Internal("Session has no uploaded table".to_string()))?;

        mapping.validate_against(table)?;

        session.mapping = Some(mapping);
        session.state = ImportState::ColumnsMapped;
        self.preview(session)
    }

    /// Parses the whole file with the completed mapping.
    pub fn preview(&self, session: &mut ImportSession) -> Result<ImportPreview> {
        if !matches!(
            session.state,
            ImportState::ColumnsMapped | ImportState::Previewed
        ) {
            return Err(AppError::ValidationError(format!(
                "Complete the column mapping first (session is {})",
                session.state
            )));
        }
        let (table, mapping) = match (&session.table, &session.mapping) {
            (Some(table), Some(mapping)) => (table, mapping),
            _ => {
                return Err(AppError::Internal(
                    "Mapped session is missing its table or mapping".to_string(),
                ))
            }
        };

        let questions = parse_table(table, mapping, self.settings.option_lettering)?;
        let total = questions.len();
        let message = if total == 0 {
            "No valid questions found in the file".to_string()
        } else {
            format!("Parsed {} questions", total)
        };

        session.questions = questions;
        session.state = ImportState::Previewed;

        let preview = ImportPreview {
            session_id: session.id.clone(),
            state: session.state,
            total,
            preview: session
                .questions
                .iter()
                .take(self.settings.preview_limit)
                .cloned()
                .collect(),
            message,
        };
        if preview.is_empty() {
            warn!(session_id = %session.id, "Import produced no valid questions");
        } else {
            info!(session_id = %session.id, total, "Import previewed");
        }
        Ok(preview)
    }

    /// Appends the previewed questions to `level`.
    /// On a storage failure the session keeps its questions so the save can be retried.
    pub fn save(&self, session: &mut ImportSession, level: DifficultyLevel) -> Result<SaveOutcome> {
        if session.state != ImportState::Previewed {
            return Err(AppError::ValidationError(format!(
                "Nothing to save yet (session is {})",
                session.state
            )));
        }
        if session.questions.is_empty() {
            return Err(AppError::ValidationError(
                "No valid questions to save".to_string(),
            ));
        }

        let saved = session.questions.len();
        let level_size = self
            .bank
            .append(level, session.questions.clone())
            .map_err(|err| {
                warn!(session_id = %session.id, error = %err, "Saving questions failed");
                err
            })?;

        session.reset();
        session.state = ImportState::Saved;

        Ok(SaveOutcome {
            session_id: session.id.clone(),
            state: session.state,
            level,
            saved,
            level_size,
            message: format!("Saved {} questions to level \"{}\"", saved, level),
        })
    }
}

//! Column roles chosen by the user from the detected header list

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use crate::domain::csv::RawTable;
use crate::domain::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[validate(length(min = 1, message = "question column is required"))]
    pub question_column: String,

    /// Option columns in answer order; position decides the option letter
    #[validate(length(min = 2, max = 4, message = "select between 2 and 4 option columns"))]
    pub option_columns: Vec<String>,

    #[validate(length(min = 1, message = "correct answer column is required"))]
    pub correct_answer_column: String,
}

impl ColumnMapping {
    pub fn new(
        question_column: impl Into<String>,
        option_columns: Vec<String>,
        correct_answer_column: impl Into<String>,
    ) -> Self {
        Self {
            question_column: question_column.into(),
            option_columns,
            correct_answer_column: correct_answer_column.into(),
        }
    }

    /// Checks the mapping is complete and only names headers of `table`.
    pub fn validate_against(&self, table: &RawTable) -> Result<()> {
        self.validate()?;

        let mut seen = HashSet::new();
        for column in &self.option_columns {
            if !seen.insert(column.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "option column '{}' is selected more than once",
                    column
                )));
            }
        }

        let selected = std::iter::once(&self.question_column)
            .chain(self.option_columns.iter())
            .chain(std::iter::once(&self.correct_answer_column));
        for column in selected {
            if !table.has_header(column) {
                return Err(AppError::ValidationError(format!(
                    "column '{}' is not in the file headers",
                    column
                )));
            }
        }

        Ok(())
    }
}

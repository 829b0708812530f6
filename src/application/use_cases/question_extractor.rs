// ============================================================
// QUESTION EXTRACTOR
// ============================================================
// Turn normalized CSV rows into quiz questions

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::column_mapping::ColumnMapping;
use crate::domain::csv::CsvRow;
use crate::domain::import_settings::OptionLettering;
use crate::domain::question::{option_letter, AnswerOption, Question};

static OPTION_NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

static OPTION_LETTER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-dA-D]$").unwrap());

/// Builds a question from one row, or `None` when the row has no question
/// text, fewer than two options, or an unresolvable correct answer.
pub fn extract_question(
    row: &CsvRow,
    mapping: &ColumnMapping,
    lettering: OptionLettering,
) -> Option<Question> {
    let question = row
        .get(&mapping.question_column)
        .filter(|text| !text.is_empty())?;

    let options = build_options(row, &mapping.option_columns, lettering);
    let correct_answer = row
        .get(&mapping.correct_answer_column)
        .and_then(|value| resolve_correct_answer(value, &options))?;

    if options.len() < 2 {
        return None;
    }

    Some(Question {
        id: row.index,
        question: question.to_string(),
        options,
        correct_answer,
    })
}

/// One option per mapped column, empty ones dropped.
pub fn build_options(
    row: &CsvRow,
    option_columns: &[String],
    lettering: OptionLettering,
) -> Vec<AnswerOption> {
    let texts = option_columns
        .iter()
        .map(|column| row.get(column).unwrap_or_default());

    match lettering {
        OptionLettering::Positional => texts
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(index, text)| AnswerOption::new(index, text))
            .collect(),
        OptionLettering::Contiguous => texts
            .filter(|text| !text.trim().is_empty())
            .enumerate()
            .map(|(index, text)| AnswerOption::new(index, text))
            .collect(),
    }
}

/// Resolves the raw correct-answer cell, first matching rule wins:
/// 1. digits: 1-based option number, must fall within the surviving options
/// 2. a single letter a-d in any case, taken as is
/// 3. text equal (ignoring case) to one of the options
pub fn resolve_correct_answer(value: &str, options: &[AnswerOption]) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    if OPTION_NUMBER_PATTERN.is_match(value) {
        return value
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .filter(|index| *index < options.len())
            .map(option_letter);
    }

    if OPTION_LETTER_PATTERN.is_match(value) {
        return Some(value.to_lowercase());
    }

    let wanted = value.to_lowercase();
    options
        .iter()
        .find(|option| option.text.to_lowercase() == wanted)
        .map(|option| option.id.clone())
}

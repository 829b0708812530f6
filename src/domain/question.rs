use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter id for the option at `index` (0 -> "a", 1 -> "b", ...)
pub fn option_letter(index: usize) -> String {
    u32::try_from(index)
        .ok()
        .and_then(|offset| char::from_u32(u32::from(b'a') + offset))
        .map(String::from)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

impl AnswerOption {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            id: option_letter(index),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Row index during import, position within its level once saved
    pub id: usize,
    pub question: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
    Quiz,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
        DifficultyLevel::Quiz,
    ];
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel::Easy
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
            Self::Quiz => write!(f, "quiz"),
        }
    }
}

impl std::str::FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "quiz" => Ok(Self::Quiz),
            _ => Err(format!("Unknown difficulty level: {}", s)),
        }
    }
}

/// Stored question bank, one ordered list per level.
/// Serialized as `{ "easy": [...], "medium": [...], "hard": [...], "quiz": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    pub easy: Vec<Question>,
    #[serde(default)]
    pub medium: Vec<Question>,
    #[serde(default)]
    pub hard: Vec<Question>,
    #[serde(default)]
    pub quiz: Vec<Question>,
}

impl QuestionBank {
    pub fn level(&self, level: DifficultyLevel) -> &[Question] {
        match level {
            DifficultyLevel::Easy => &self.easy,
            DifficultyLevel::Medium => &self.medium,
            DifficultyLevel::Hard => &self.hard,
            DifficultyLevel::Quiz => &self.quiz,
        }
    }

    fn level_mut(&mut self, level: DifficultyLevel) -> &mut Vec<Question> {
        match level {
            DifficultyLevel::Easy => &mut self.easy,
            DifficultyLevel::Medium => &mut self.medium,
            DifficultyLevel::Hard => &mut self.hard,
            DifficultyLevel::Quiz => &mut self.quiz,
        }
    }

    /// Appends `questions` to `level`, renumbering them
    /// `existing + 1 ..= existing + n` in the given order.
    /// Returns the new size of the level.
    pub fn append(&mut self, level: DifficultyLevel, questions: Vec<Question>) -> usize {
        let target = self.level_mut(level);
        let existing = target.len();
        target.extend(
            questions
                .into_iter()
                .enumerate()
                .map(|(position, question)| Question {
                    id: existing + position + 1,
                    ..question
                }),
        );
        target.len()
    }

    pub fn total(&self) -> usize {
        DifficultyLevel::ALL
            .iter()
            .map(|level| self.level(*level).len())
            .sum()
    }
}

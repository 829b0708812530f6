use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::domain::error::{AppError, Result};
use crate::domain::question::{DifficultyLevel, Question, QuestionBank};
use crate::infrastructure::storage::KeyValueStore;

/// Reads and appends to the question bank stored under a single key.
///
/// Every save rewrites the whole bank. Saves from this process are
/// serialized; writers in other processes still race (last write wins).
pub struct QuestionBankUseCase {
    store: Arc<dyn KeyValueStore>,
    store_key: String,
    write_lock: Mutex<()>,
}

impl QuestionBankUseCase {
    pub fn new(store: Arc<dyn KeyValueStore>, store_key: impl Into<String>) -> Self {
        Self {
            store,
            store_key: store_key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Missing key means an empty bank.
    pub fn load(&self) -> Result<QuestionBank> {
        match self.store.get(&self.store_key)? {
            Some(json) => serde_json::from_str(&json).map_err(|err| {
                error!(error = %err, key = %self.store_key, "Stored question bank is malformed");
                AppError::StorageError(format!("Failed to parse stored question bank: {}", err))
            }),
            None => Ok(QuestionBank::default()),
        }
    }

    pub fn level(&self, level: DifficultyLevel) -> Result<Vec<Question>> {
        Ok(self.load()?.level(level).to_vec())
    }

    /// Appends `questions` to `level` and writes the bank back.
    /// Returns the new size of the level.
    pub fn append(&self, level: DifficultyLevel, questions: Vec<Question>) -> Result<usize> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Internal("Question bank lock poisoned".to_string()))?;

        let added = questions.len();
        let mut bank = self.load()?;
        let level_size = bank.append(level, questions);

        let serialized = serde_json::to_string(&bank).map_err(|err| {
            AppError::StorageError(format!("Failed to serialize question bank: {}", err))
        })?;
        self.store.set(&self.store_key, &serialized)?;

        info!(
            level = %level,
            added,
            level_size,
            total = bank.total(),
            "Question bank saved"
        );
        Ok(level_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::question::AnswerOption;
    use crate::infrastructure::storage::MemoryStore;

    const KEY: &str = "voltKickQuestions";

    fn question(id: usize, text: &str) -> Question {
        Question {
            id,
            question: text.to_string(),
            options: vec![AnswerOption::new(0, "x"), AnswerOption::new(1, "y")],
            correct_answer: "b".to_string(),
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(AppError::StorageError("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_load_missing_key_is_empty_bank() {
        let use_case = QuestionBankUseCase::new(Arc::new(MemoryStore::new()), KEY);
        assert_eq!(use_case.load().unwrap(), QuestionBank::default());
    }

    #[test]
    fn test_append_to_existing_level() {
        let store = Arc::new(MemoryStore::new());
        let mut existing = QuestionBank::default();
        existing.hard = vec![question(1, "h1"), question(2, "h2")];
        existing.easy = vec![question(1, "e1")];
        store
            .set(KEY, &serde_json::to_string(&existing).unwrap())
            .unwrap();

        let use_case = QuestionBankUseCase::new(store.clone(), KEY);
        let size = use_case
            .append(
                DifficultyLevel::Hard,
                vec![question(4, "n1"), question(7, "n2"), question(9, "n3")],
            )
            .unwrap();

        assert_eq!(size, 5);
        let bank = use_case.load().unwrap();
        let ids: Vec<usize> = bank.hard.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let texts: Vec<&str> = bank.hard[2..].iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["n1", "n2", "n3"]);
        assert_eq!(bank.easy, existing.easy);
        assert!(bank.medium.is_empty());
    }

    #[test]
    fn test_malformed_bank_is_storage_error() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY, "not json").unwrap();

        let use_case = QuestionBankUseCase::new(store, KEY);
        assert!(matches!(use_case.load(), Err(AppError::StorageError(_))));
        assert!(use_case
            .append(DifficultyLevel::Easy, vec![question(1, "q")])
            .is_err());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let use_case = QuestionBankUseCase::new(Arc::new(FailingStore), KEY);
        let result = use_case.append(DifficultyLevel::Quiz, vec![question(1, "q")]);
        assert!(matches!(result, Err(AppError::StorageError(_))));
    }

    #[test]
    fn test_level_view() {
        let use_case = QuestionBankUseCase::new(Arc::new(MemoryStore::new()), KEY);
        use_case
            .append(DifficultyLevel::Medium, vec![question(3, "m")])
            .unwrap();
        assert_eq!(use_case.level(DifficultyLevel::Medium).unwrap().len(), 1);
        assert!(use_case.level(DifficultyLevel::Easy).unwrap().is_empty());
    }
}

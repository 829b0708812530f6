pub mod use_cases;

pub use use_cases::csv_import::{parse_questions_from_csv, CsvImportUseCase};
pub use use_cases::question_bank::QuestionBankUseCase;

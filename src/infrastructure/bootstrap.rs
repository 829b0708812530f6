use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::application::{CsvImportUseCase, QuestionBankUseCase};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage::{resolve_data_dir, JsonFileStore};
use crate::interfaces::http::{add_log, HttpState, LogEntry};

pub fn build_state(config: &AppConfig) -> Result<HttpState> {
    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));

    let data_dir = resolve_data_dir(&config.data_dir).map_err(|err| {
        error!(
            error = %err,
            data_dir = %config.data_dir.display(),
            "Failed to create data dir"
        );
        AppError::StorageError(format!(
            "Failed to create data dir {}: {}",
            config.data_dir.display(),
            err
        ))
    })?;

    let store = JsonFileStore::new(data_dir);
    info!(
        data_dir = %store.root().display(),
        store_key = %config.store_key,
        "Question bank store ready"
    );
    add_log(
        &logs,
        "INFO",
        "Bootstrap",
        &format!(
            "Question bank stored in {} under key {}",
            store.root().display(),
            config.store_key
        ),
    );

    let bank_use_case = Arc::new(QuestionBankUseCase::new(
        Arc::new(store),
        config.store_key.clone(),
    ));
    let import_use_case = Arc::new(CsvImportUseCase::new(
        config.import_settings(),
        bank_use_case.clone(),
    ));

    Ok(HttpState::new(import_use_case, bank_use_case, logs))
}

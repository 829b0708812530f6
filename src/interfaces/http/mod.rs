use crate::application::{CsvImportUseCase, QuestionBankUseCase};
use crate::domain::column_mapping::ColumnMapping;
use crate::domain::error::{AppError, Result};
use crate::domain::import_session::ImportSession;
use crate::domain::question::DifficultyLevel;
use actix_cors::Cors;
use actix_web::{
    delete, dev::Server, get, post, put, web, App, HttpResponse, HttpServer, Responder,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const MAX_LOG_ENTRIES: usize = 100;
const MAX_SESSIONS: usize = 64;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub import_use_case: Arc<CsvImportUseCase>,
    pub bank_use_case: Arc<QuestionBankUseCase>,
    pub sessions: Mutex<HashMap<String, ImportSession>>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl HttpState {
    pub fn new(
        import_use_case: Arc<CsvImportUseCase>,
        bank_use_case: Arc<QuestionBankUseCase>,
        logs: Arc<Mutex<Vec<LogEntry>>>,
    ) -> Self {
        Self {
            import_use_case,
            bank_use_case,
            sessions: Mutex::new(HashMap::new()),
            logs,
        }
    }

    /// Runs `f` against the session with `id` while holding the session map.
    fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut ImportSession) -> Result<T>,
    ) -> Result<T> {
        let mut sessions = self.lock_sessions()?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Import session {}", id)))?;
        f(session)
    }

    fn lock_sessions(&self) -> Result<MutexGuard<'_, HashMap<String, ImportSession>>> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("Session map lock poisoned".to_string()))
    }

    fn take_session(&self, id: &str) -> Result<ImportSession> {
        self.lock_sessions()?
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Import session {}", id)))
    }

    /// Inserts `session`, evicting the oldest one when the map is full.
    fn put_session(&self, session: ImportSession) -> Result<()> {
        let mut sessions = self.lock_sessions()?;
        if sessions.len() >= MAX_SESSIONS && !sessions.contains_key(&session.id) {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.created_at)
                .map(|s| s.id.clone());
            if let Some(id) = oldest {
                sessions.remove(&id);
                debug!(session_id = %id, "Evicted oldest import session");
            }
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub level: DifficultyLevel,
}

fn error_response(err: &AppError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        AppError::ValidationError(_) | AppError::ParseError(_) | AppError::IoError(_) => {
            HttpResponse::BadRequest().json(body)
        }
        AppError::NotFound(_) => HttpResponse::NotFound().json(body),
        AppError::StorageError(_) => HttpResponse::ServiceUnavailable().json(body),
        AppError::Internal(_) | AppError::ConfigError(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: Serialize>(
    logs: &Mutex<Vec<LogEntry>>,
    action: &str,
    result: Result<T>,
) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            add_log(logs, "ERROR", "Import", &format!("{} failed: {}", action, e));
            error_response(&e)
        }
    }
}

#[post("/import/sessions")]
async fn create_session(data: web::Data<HttpState>, body: web::Bytes) -> impl Responder {
    let mut session = ImportSession::new();
    add_log(
        &data.logs,
        "INFO",
        "Import",
        &format!("Upload received ({} bytes) for session {}", body.len(), session.id),
    );

    let result = data
        .import_use_case
        .load_upload(&mut session, &body)
        .and_then(|summary| {
            data.put_session(session)?;
            Ok(summary)
        });

    respond(&data.logs, "Upload", result)
}

#[put("/import/sessions/{id}/file")]
async fn replace_file(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let result = data.with_session(&path, |session| {
        data.import_use_case.load_upload(session, &body)
    });
    respond(&data.logs, "Upload", result)
}

#[post("/import/sessions/{id}/mapping")]
async fn complete_mapping(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    mapping: web::Json<ColumnMapping>,
) -> impl Responder {
    let result = data.with_session(&path, |session| {
        data.import_use_case
            .complete_mapping(session, mapping.into_inner())
    });
    if let Ok(preview) = &result {
        add_log(
            &data.logs,
            if preview.is_empty() { "WARN" } else { "INFO" },
            "Import",
            &preview.message,
        );
    }
    respond(&data.logs, "Column mapping", result)
}

#[post("/import/sessions/{id}/save")]
async fn save_questions(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    req: web::Json<SaveRequest>,
) -> impl Responder {
    // The session leaves the map while the bank is written; a saved
    // session is not kept.
    let result = data.take_session(&path).and_then(|mut session| {
        let outcome = data.import_use_case.save(&mut session, req.level);
        if outcome.is_err() {
            data.put_session(session)?;
        }
        outcome
    });
    if let Ok(outcome) = &result {
        add_log(&data.logs, "INFO", "Import", &outcome.message);
    }
    respond(&data.logs, "Save", result)
}

#[get("/import/sessions/{id}")]
async fn get_session(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let result = data.with_session(&path, |session| Ok(session.summary()));
    respond(&data.logs, "Session lookup", result)
}

#[delete("/import/sessions/{id}")]
async fn delete_session(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let result = data
        .take_session(&path)
        .map(|session| serde_json::json!({ "deleted": session.id }));
    respond(&data.logs, "Session delete", result)
}

#[get("/bank")]
async fn get_bank(data: web::Data<HttpState>) -> impl Responder {
    respond(&data.logs, "Bank load", data.bank_use_case.load())
}

#[get("/bank/{level}")]
async fn get_bank_level(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let result = path
        .parse::<DifficultyLevel>()
        .map_err(AppError::ValidationError)
        .and_then(|level| data.bank_use_case.level(level));
    respond(&data.logs, "Bank load", result)
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    match data.logs.lock() {
        Ok(logs) => HttpResponse::Ok().json(&*logs),
        Err(_) => error_response(&AppError::Internal("Log buffer lock poisoned".to_string())),
    }
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    if let Ok(mut logs) = logs.lock() {
        logs.push(entry);
        if logs.len() > MAX_LOG_ENTRIES {
            logs.remove(0);
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(create_session)
            .service(replace_file)
            .service(complete_mapping)
            .service(save_questions)
            .service(get_session)
            .service(delete_session)
            .service(get_bank)
            .service(get_bank_level)
            .service(get_logs),
    );
}

pub fn start_server(
    state: web::Data<HttpState>,
    host: &str,
    port: u16,
    max_upload_bytes: usize,
) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import_settings::ImportSettings;
    use crate::domain::question::QuestionBank;
    use crate::infrastructure::storage::{KeyValueStore, MemoryStore};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    const QUIZ_CSV: &str = "q,a,b,c,ans\nCapital of France?,Paris,Rome,Berlin,1\nLargest ocean?,Atlantic,Pacific,,pacific\n";

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(AppError::StorageError("read-only store".to_string()))
        }
    }

    fn state() -> web::Data<HttpState> {
        state_with(Arc::new(MemoryStore::new()))
    }

    fn state_with(store: Arc<dyn KeyValueStore>) -> web::Data<HttpState> {
        let bank = Arc::new(QuestionBankUseCase::new(store, "voltKickQuestions"));
        let import = Arc::new(CsvImportUseCase::new(
            ImportSettings::default(),
            bank.clone(),
        ));
        web::Data::new(HttpState::new(
            import,
            bank,
            Arc::new(Mutex::new(Vec::new())),
        ))
    }

    fn mapping_body() -> Value {
        serde_json::json!({
            "questionColumn": "q",
            "optionColumns": ["a", "b", "c"],
            "correctAnswerColumn": "ans"
        })
    }

    #[actix_web::test]
    async fn test_import_flow() {
        let data = state();
        let app = test::init_service(
            App::new()
                .app_data(data.clone())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/import/sessions")
            .set_payload(QUIZ_CSV)
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["state"], "headersDetected");
        assert_eq!(created["delimiter"], ",");
        assert_eq!(created["headers"][4], "ans");
        let id = created["sessionId"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/import/sessions/{}/mapping", id))
            .set_json(mapping_body())
            .to_request();
        let preview: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(preview["state"], "previewed");
        assert_eq!(preview["total"], 2);
        assert_eq!(preview["preview"][1]["correctAnswer"], "b");

        let req = test::TestRequest::post()
            .uri(&format!("/api/import/sessions/{}/save", id))
            .set_json(serde_json::json!({ "level": "quiz" }))
            .to_request();
        let saved: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved["saved"], 2);
        assert_eq!(saved["levelSize"], 2);
        assert_eq!(saved["state"], "saved");

        let req = test::TestRequest::get()
            .uri(&format!("/api/import/sessions/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(data.sessions.lock().unwrap().is_empty());

        let req = test::TestRequest::get().uri("/api/bank").to_request();
        let bank: QuestionBank = test::call_and_read_body_json(&app, req).await;
        assert_eq!(bank.quiz.len(), 2);
        assert_eq!(bank.quiz[1].id, 2);
        assert!(bank.easy.is_empty());

        let req = test::TestRequest::get().uri("/api/bank/quiz").to_request();
        let level: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(level.as_array().map(|q| q.len()), Some(2));

        let req = test::TestRequest::get().uri("/api/logs").to_request();
        let logs: Vec<LogEntry> = test::call_and_read_body_json(&app, req).await;
        assert!(logs.iter().any(|entry| entry.message.contains("Saved 2 questions")));
    }

    #[actix_web::test]
    async fn test_incomplete_mapping_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/import/sessions")
            .set_payload(QUIZ_CSV)
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["sessionId"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/import/sessions/{}/mapping", id))
            .set_json(serde_json::json!({
                "questionColumn": "q",
                "optionColumns": ["a"],
                "correctAnswerColumn": "ans"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri(&format!("/api/import/sessions/{}", id))
            .to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["state"], "headersDetected");
    }

    #[actix_web::test]
    async fn test_unknown_session_and_level() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/import/sessions/missing")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/bank/extreme").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_invalid_utf8_upload_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/import/sessions")
            .set_payload(vec![0x71u8, 0xFF, 0x0A])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_delete_session() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/import/sessions")
            .set_payload(QUIZ_CSV)
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["sessionId"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/import/sessions/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/api/import/sessions/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_failed_save_keeps_session() {
        let data = state_with(Arc::new(ReadOnlyStore));
        let app = test::init_service(
            App::new()
                .app_data(data.clone())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/import/sessions")
            .set_payload(QUIZ_CSV)
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["sessionId"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/import/sessions/{}/mapping", id))
            .set_json(mapping_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/import/sessions/{}/save", id))
            .set_json(serde_json::json!({ "level": "easy" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let req = test::TestRequest::get()
            .uri(&format!("/api/import/sessions/{}", id))
            .to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["state"], "previewed");
        assert_eq!(summary["questionCount"], 2);
        assert_eq!(data.sessions.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_session_map_is_bounded() {
        let data = state();
        let mut first_id = String::new();
        for i in 0..(MAX_SESSIONS + 1) {
            let mut session = ImportSession::new();
            session.created_at = i as i64;
            if i == 0 {
                first_id = session.id.clone();
            }
            data.put_session(session).unwrap();
        }

        let sessions = data.sessions.lock().unwrap();
        assert_eq!(sessions.len(), MAX_SESSIONS);
        assert!(!sessions.contains_key(&first_id));
    }

    #[actix_web::test]
    async fn test_log_buffer_is_bounded() {
        let logs = Mutex::new(Vec::new());
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            add_log(&logs, "INFO", "Test", &format!("entry {}", i));
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "entry 5");
    }
}

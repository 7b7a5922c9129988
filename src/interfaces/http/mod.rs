use crate::application::AppContext;
use crate::domain::error::AppError;
use crate::infrastructure::config::AppConfig;
use actix_cors::Cors;
use actix_web::cookie::Cookie;
use actix_web::{
    dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpResponseBuilder, HttpServer,
    Responder,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const SESSION_COOKIE: &str = "session_id";

static UNSAFE_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

pub struct HttpState {
    pub context: Arc<AppContext>,
    pub upload_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub summary: String,
}

/// Visitor identity carried in the `session_id` cookie
struct SessionId {
    id: String,
    is_new: bool,
}

impl SessionId {
    fn from_request(req: &HttpRequest) -> Self {
        match req.cookie(SESSION_COOKIE) {
            Some(cookie) if !cookie.value().is_empty() => Self {
                id: cookie.value().to_string(),
                is_new: false,
            },
            _ => Self {
                id: uuid::Uuid::new_v4().simple().to_string(),
                is_new: true,
            },
        }
    }

    fn attach(&self, builder: &mut HttpResponseBuilder) {
        if self.is_new {
            builder.cookie(
                Cookie::build(SESSION_COOKIE, self.id.clone())
                    .path("/")
                    .http_only(true)
                    .finish(),
            );
        }
    }
}

#[post("/chat")]
async fn chat(
    data: web::Data<HttpState>,
    http_req: HttpRequest,
    req: web::Json<ChatRequest>,
) -> impl Responder {
    let session = SessionId::from_request(&http_req);

    match data.context.chat(Some(session.id.as_str()), &req.message) {
        Ok(reply) => {
            let mut builder = HttpResponse::Ok();
            session.attach(&mut builder);
            builder.json(reply)
        }
        Err(AppError::ValidationError(message)) => {
            let mut builder = HttpResponse::BadRequest();
            session.attach(&mut builder);
            builder.json(json!({ "reply": message }))
        }
        Err(e) => {
            error!(error = %e, "Chat failed");
            error_response(&e)
        }
    }
}

#[post("/upload")]
async fn upload(
    data: web::Data<HttpState>,
    http_req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> impl Responder {
    let session = SessionId::from_request(&http_req);

    let requested = query.filename.as_deref().map(str::trim).unwrap_or_default();
    if requested.is_empty() || body.is_empty() {
        return bad_request("Select a CSV or Excel file to upload.");
    }

    let filename = secure_filename(requested);
    if filename.is_empty() {
        return bad_request("Invalid file name.");
    }

    if let Err(e) = tokio::fs::create_dir_all(&data.upload_dir).await {
        error!(error = %e, "Failed to create upload dir");
        return error_response(&AppError::from(e));
    }

    let path = stored_upload_path(&data.upload_dir, &filename);
    if let Err(e) = tokio::fs::write(&path, &body).await {
        error!(error = %e, path = %path.display(), "Failed to save upload");
        return error_response(&AppError::from(e));
    }

    let context = Arc::clone(&data.context);
    let session_id = session.id.clone();
    let parse_path = path.clone();
    let result = web::block(move || context.upload(Some(session_id.as_str()), &parse_path))
        .await
        .unwrap_or_else(|e| Err(AppError::Internal(e.to_string())));

    // The table lives in the session cache now
    if let Err(e) = tokio::fs::remove_file(&path).await {
        warn!(error = %e, path = %path.display(), "Failed to remove upload");
    }

    match result {
        Ok(outcome) => {
            info!(filename = %filename, session_id = %session.id, "Upload profiled");
            let mut builder = HttpResponse::Ok();
            session.attach(&mut builder);
            builder.json(UploadResponse {
                message: "File uploaded successfully.".to_string(),
                filename,
                summary: outcome.summary,
            })
        }
        Err(e) => {
            warn!(error = %e, filename = %filename, "Upload rejected");
            match e {
                AppError::UnsupportedFormat(message) => bad_request(&message),
                AppError::ParseError(_) => bad_request("Unable to read the uploaded file."),
                other => error_response(&other),
            }
        }
    }
}

#[get("/dataset")]
async fn dataset(data: web::Data<HttpState>, http_req: HttpRequest) -> impl Responder {
    let session_id = http_req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

    match data.context.dataset(session_id.as_deref()) {
        Some(entry) => HttpResponse::Ok().json(json!({
            "uploaded_at": entry.uploaded_at,
            "profile": entry.profile,
        })),
        None => HttpResponse::NotFound().json(json!({
            "error": "No dataset uploaded for this session."
        })),
    }
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "sessions": data.context.sessions().len(),
    }))
}

/// Register the `/api` routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(chat)
            .service(upload)
            .service(dataset)
            .service(health),
    );
}

/// Keep ASCII letters, digits, `_`, `.` and `-`; whitespace and path separators become `_`
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    UNSAFE_FILENAME_CHARS
        .replace_all(&joined, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// Per-request location for an upload; the extension is kept for format detection
fn stored_upload_path(upload_dir: &Path, filename: &str) -> PathBuf {
    upload_dir.join(format!("{}_{}", uuid::Uuid::new_v4().simple(), filename))
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": message }))
}

fn error_response(err: &AppError) -> HttpResponse {
    if err.is_client_error() {
        bad_request(&err.to_string())
    } else {
        HttpResponse::InternalServerError().json(json!({ "error": err.to_string() }))
    }
}

pub fn start_server(context: Arc<AppContext>, config: &AppConfig) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState {
        context,
        upload_dir: config.server.upload_dir.clone(),
    });
    let max_upload_bytes = config.server.max_upload_bytes;

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .configure(configure)
    })
    .bind(config.bind_address())?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::KnowledgeBaseEngine;
    use crate::domain::knowledge::KbEntry;
    use crate::infrastructure::config::SessionConfig;
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::Value;

    fn state(upload_dir: PathBuf) -> web::Data<HttpState> {
        let engine = KnowledgeBaseEngine::from_entries(
            vec![KbEntry {
                topic: "kpi_design".to_string(),
                questions: vec!["What makes a good KPI?".to_string()],
                answer: "A good KPI is measurable and tied to a decision.".to_string(),
            }],
            0.22,
            0.65,
        );
        web::Data::new(HttpState {
            context: Arc::new(AppContext::with_engine(engine, &SessionConfig::default())),
            upload_dir,
        })
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Sales.csv"), "My_Sales.csv");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("données.xlsx"), "donnes.xlsx");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_stored_upload_paths_are_unique() {
        let dir = Path::new("uploads");
        let first = stored_upload_path(dir, "data.csv");
        let second = stored_upload_path(dir, "data.csv");

        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(dir));
        assert_eq!(first.extension().and_then(|e| e.to_str()), Some("csv"));
    }

    fn upload_dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    #[actix_web::test]
    async fn test_same_filename_from_two_sessions_stays_separate() {
        let dir = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(
            App::new().app_data(state(dir.path().into())).configure(configure),
        )
        .await;

        for (session, content) in [("a", "v\n1\n2\n"), ("b", "v\n5\n")] {
            let req = actix_test::TestRequest::post()
                .uri("/api/upload?filename=data.csv")
                .cookie(Cookie::new(SESSION_COOKIE, session))
                .set_payload(content)
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert!(upload_dir_is_empty(dir.path()));

        let req = actix_test::TestRequest::post()
            .uri("/api/chat")
            .cookie(Cookie::new(SESSION_COOKIE, "a"))
            .set_json(json!({ "message": "total v" }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["reply"], "The total of 'v' is 3.");
    }

    #[actix_web::test]
    async fn test_chat_empty_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            actix_test::init_service(App::new().app_data(state(dir.path().into())).configure(configure))
                .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/chat")
            .set_json(json!({ "message": "  " }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["reply"], "Please enter a question to analyze.");
    }

    #[actix_web::test]
    async fn test_chat_assigns_session_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            actix_test::init_service(App::new().app_data(state(dir.path().into())).configure(configure))
                .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/chat")
            .set_json(json!({ "message": "Any Tableau advice?" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .unwrap();
        assert_eq!(cookie.value().len(), 32);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["source"], "knowledge_base");
        assert!((body["confidence"].as_f64().unwrap() - 0.65).abs() < 1e-6);
    }

    #[actix_web::test]
    async fn test_upload_then_dataset_questions() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            actix_test::init_service(App::new().app_data(state(dir.path().into())).configure(configure))
                .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/upload?filename=people.csv")
            .cookie(Cookie::new(SESSION_COOKIE, "abc"))
            .set_payload("age,city\n30,NYC\n40,LA\n30,NYC\n")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["filename"], "people.csv");
        assert!(body["summary"]
            .as_str()
            .unwrap()
            .starts_with("Rows: 3, Columns: 2"));

        let req = actix_test::TestRequest::post()
            .uri("/api/chat")
            .cookie(Cookie::new(SESSION_COOKIE, "abc"))
            .set_json(json!({ "message": "most common city" }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["reply"], "The most common values in 'city' are: NYC (2), LA (1).");
        assert_eq!(body["source"], "dataset");
        assert!(body.get("confidence").is_none());

        let req = actix_test::TestRequest::get()
            .uri("/api/dataset")
            .cookie(Cookie::new(SESSION_COOKIE, "abc"))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["profile"]["rows"], 3);
        assert_eq!(body["profile"]["column_details"][0]["dtype"], "numeric");
    }

    #[actix_web::test]
    async fn test_unsupported_upload_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            actix_test::init_service(App::new().app_data(state(dir.path().into())).configure(configure))
                .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/upload?filename=notes.txt")
            .set_payload("a,b\n1,2\n")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(
            body["error"],
            "Unsupported file type. Please upload CSV or Excel files."
        );
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[actix_web::test]
    async fn test_unreadable_workbook_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            actix_test::init_service(App::new().app_data(state(dir.path().into())).configure(configure))
                .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/upload?filename=report.xlsx")
            .set_payload("not a workbook")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unable to read the uploaded file.");
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[actix_web::test]
    async fn test_upload_without_filename() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            actix_test::init_service(App::new().app_data(state(dir.path().into())).configure(configure))
                .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/upload")
            .set_payload("a\n1\n")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_dataset_without_upload_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            actix_test::init_service(App::new().app_data(state(dir.path().into())).configure(configure))
                .await;

        let req = actix_test::TestRequest::get().uri("/api/dataset").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            actix_test::init_service(App::new().app_data(state(dir.path().into())).configure(configure))
                .await;

        let req = actix_test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }
}

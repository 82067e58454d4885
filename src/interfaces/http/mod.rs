pub mod charts;
mod page;

use crate::application::BugClassificationUseCase;
use crate::domain::app_config::AppConfig;
use crate::domain::bug_report::ClassificationReport;
use crate::domain::error::AppError;
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use charts::ReportCharts;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub classification: Arc<BugClassificationUseCase>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
    pub max_upload_bytes: usize,
}

#[derive(Deserialize)]
pub struct ClassifyQuery {
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub report: ClassificationReport,
    pub charts: ReportCharts,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub classes: Vec<String>,
    pub n_features: usize,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::MissingColumn(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::ParseError(_) | AppError::UnsupportedFormat(_) | AppError::ValidationError(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: message })
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page::INDEX_HTML)
}

#[post("/classify")]
async fn classify(
    data: web::Data<HttpState>,
    query: web::Query<ClassifyQuery>,
    payload: web::Payload,
) -> impl Responder {
    let Some(file_name) = query.into_inner().file_name.filter(|name| !name.trim().is_empty())
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            AppError::ValidationError("Missing file_name query parameter".to_string()).to_string(),
        );
    };

    let bytes = match payload.to_bytes_limited(data.max_upload_bytes).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Failed to read upload {}: {}", file_name, e),
            );
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
        Err(_) => {
            add_log(
                &data.logs,
                "WARN",
                "HttpApi",
                &format!(
                    "Rejected upload {}: larger than {} bytes",
                    file_name, data.max_upload_bytes
                ),
            );
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "The uploaded file exceeds the {} byte limit.",
                    data.max_upload_bytes
                ),
            );
        }
    };

    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Classifying {} ({} bytes)", file_name, bytes.len()),
    );

    let use_case = data.classification.clone();
    let name = file_name.clone();
    let result = tokio::task::spawn_blocking(move || use_case.execute(&name, &bytes)).await;

    match result {
        Ok(Ok(report)) => {
            add_log(
                &data.logs,
                "INFO",
                "HttpApi",
                &format!(
                    "Classified {} rows from {} (run {})",
                    report.rows.len(),
                    file_name,
                    report.run_id
                ),
            );
            for warning in &report.warnings {
                add_log(&data.logs, "WARN", "Pipeline", warning);
            }
            match ReportCharts::render(&report) {
                Ok(charts) => HttpResponse::Ok().json(ClassifyResponse { report, charts }),
                Err(e) => {
                    add_log(&data.logs, "ERROR", "HttpApi", &e.to_string());
                    error_response(status_for(&e), e.to_string())
                }
            }
        }
        Ok(Err(e)) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Classification of {} failed: {}", file_name, e),
            );
            error_response(status_for(&e), e.to_string())
        }
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Classification worker failed: {}", e),
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(PoisonError::into_inner);
    HttpResponse::Ok().json(&*logs)
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> impl Responder {
    let classifier = data.classification.classifier();
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        classes: classifier.categories(),
        n_features: classifier.n_features(),
    })
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(
        web::scope("/api")
            .service(classify)
            .service(get_logs)
            .service(health),
    );
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(PoisonError::into_inner);
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

/// Record an entry for `/api/logs` and emit it through `tracing`
pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    match level {
        "ERROR" => tracing::error!(source, "{}", message),
        "WARN" => tracing::warn!(source, "{}", message),
        _ => tracing::info!(source, "{}", message),
    }
    add_log_entry(logs, level, source, message);
}

pub fn start_server(
    classification: Arc<BugClassificationUseCase>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
    config: &AppConfig,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState {
        classification,
        logs,
        max_upload_bytes: config.loader.max_upload_bytes,
    });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Local tool, any origin

        App::new().wrap(cors).app_data(state.clone()).configure(routes)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run();

    Ok(server)
}

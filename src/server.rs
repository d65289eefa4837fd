//! Job HTTP server.
//!
//! Exposes the batch jobs as stateless request handlers for an external
//! scheduler or manual trigger. Success responses wrap the job outcome in
//! `{ "data": ... }`; failures return `{ "error": { "code", "message" } }`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/jobs/collect` | Run collection across all sources |
//! | `POST` | `/jobs/engine` | Full run: collect, score, cluster, correlate |
//! | `POST` | `/jobs/report` | Write the daily report snapshot |
//!
//! A job that partially failed still returns 200: the outcome carries
//! aggregate counters plus an `errors` array so the caller can see how
//! many operations were skipped.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser dashboards
//! and cross-origin schedulers can call the job endpoints directly.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::{db, engine, report};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pool: SqlitePool,
}

/// Starts the job server.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let pool = db::connect(config).await?;

    let state = AppState {
        config: Arc::new(config.clone()),
        pool,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/jobs/collect", post(handle_collect))
        .route("/jobs/engine", post(handle_engine))
        .route("/jobs/report", post(handle_report))
        .layer(cors)
        .with_state(state);

    println!("Job server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

fn data_envelope<T: Serialize>(value: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "data": value }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /jobs/collect ============

async fn handle_collect(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = engine::run_collect(&state.config, &state.pool)
        .await
        .map_err(|e| internal(e.to_string()))?;

    Ok(data_envelope(outcome))
}

// ============ POST /jobs/engine ============

#[derive(Deserialize, Default)]
struct EngineRequest {
    #[serde(default)]
    manual_trigger: bool,
}

async fn handle_engine(
    State(state): State<AppState>,
    body: Option<Json<EngineRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let outcome = engine::run_engine(&state.config, &state.pool, request.manual_trigger)
        .await
        .map_err(|e| internal(e.to_string()))?;

    Ok(data_envelope(outcome))
}

// ============ POST /jobs/report ============

#[derive(Deserialize, Default)]
struct ReportRequest {
    date: Option<String>,
}

async fn handle_report(
    State(state): State<AppState>,
    body: Option<Json<ReportRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let date = match request.date {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|_| bad_request(format!("invalid date '{}', expected YYYY-MM-DD", raw)))?,
        None => chrono::Utc::now().date_naive(),
    };

    let outcome = report::generate_daily_report(&state.config, &state.pool, date)
        .await
        .map_err(|e| internal(e.to_string()))?;

    Ok(data_envelope(outcome))
}

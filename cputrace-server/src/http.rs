//! CPUTrace HTTP REST API
//!
//! Axum-based HTTP server for uploading and browsing CPU-usage trace
//! reports.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! testable inner function. The inner functions take the pool and plain
//! arguments, so validation and status mapping can be exercised without
//! axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /health           — liveness probe with version
//! - POST /api/traces       — multipart upload of one .json trace report
//! - GET  /api/traces       — paged summary listing, newest first
//! - GET  /api/traces/{id}  — full record including the verbatim upload

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use cputrace_core::error::TraceError;
use cputrace_core::models::TraceSummary;
use cputrace_core::CpuTraceConfig;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

use crate::{ingest, query};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub pool: SqlitePool,
    pub config: CpuTraceConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/traces", post(upload_handler).get(list_handler))
        .route("/api/traces/:id", get(get_handler));

    // Any origin, method, and header — controlled by the [cors] config
    // section, see CorsConfig.
    if state.config.cors.permissive {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    pool: SqlitePool,
    config: CpuTraceConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.service.host, config.service.port);
    let state = Arc::new(HttpState { pool, config });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("CPUTrace API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: query::DEFAULT_LIMIT,
        }
    }
}

fn default_limit() -> i64 {
    query::DEFAULT_LIMIT
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }
}

/// Map the domain error taxonomy onto HTTP status codes. A store-level
/// constraint violation arrives here already re-mapped to
/// `DuplicateSession`, so it lands on 409 rather than 500.
pub fn error_status(err: &TraceError) -> StatusCode {
    match err {
        TraceError::InvalidFormat(_) | TraceError::MissingField(_) => StatusCode::BAD_REQUEST,
        TraceError::DuplicateSession(_) => StatusCode::CONFLICT,
        TraceError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(err: TraceError) -> (StatusCode, serde_json::Value) {
    let status = error_status(&err);
    let body = serde_json::to_value(ErrorResponse::new(err.to_string()))
        .unwrap_or_else(|_| serde_json::json!({"status": "error"}));
    (status, body)
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check (pure, no IO).
pub fn health_inner() -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })
}

/// Inner upload — validates and persists one trace document.
pub async fn upload_inner(
    pool: &SqlitePool,
    filename: &str,
    bytes: &[u8],
) -> (StatusCode, serde_json::Value) {
    match ingest::ingest(pool, filename, bytes).await {
        Ok(trace) => (
            StatusCode::OK,
            serde_json::to_value(TraceSummary::from(trace))
                .unwrap_or_else(|_| serde_json::json!({})),
        ),
        Err(e) => error_body(e),
    }
}

/// Inner list — paged summaries, newest first.
pub async fn list_inner(pool: &SqlitePool, params: ListParams) -> (StatusCode, serde_json::Value) {
    match query::list_summaries(pool, params.skip, params.limit).await {
        Ok(summaries) => (
            StatusCode::OK,
            serde_json::to_value(summaries).unwrap_or_else(|_| serde_json::json!([])),
        ),
        Err(e) => error_body(e),
    }
}

/// Inner get — full detail by id.
pub async fn get_inner(pool: &SqlitePool, id: i64) -> (StatusCode, serde_json::Value) {
    match query::get_detail(pool, id).await {
        Ok(detail) => (
            StatusCode::OK,
            serde_json::to_value(detail).unwrap_or_else(|_| serde_json::json!({})),
        ),
        Err(e) => error_body(e),
    }
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(health_inner()))
}

pub async fn upload_handler(
    State(state): State<Arc<HttpState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            match field.bytes().await {
                Ok(bytes) => file = Some((filename, bytes.to_vec())),
                Err(e) => {
                    tracing::warn!("failed to read multipart file field: {}", e);
                }
            }
            break;
        }
    }

    let (status, body) = match file {
        Some((filename, bytes)) => upload_inner(&state.pool, &filename, &bytes).await,
        None => (
            StatusCode::BAD_REQUEST,
            serde_json::to_value(ErrorResponse::new("multipart field 'file' is required"))
                .unwrap_or_else(|_| serde_json::json!({"status": "error"})),
        ),
    };
    (status, Json(body))
}

pub async fn list_handler(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let (status, body) = list_inner(&state.pool, params).await;
    (status, Json(body))
}

pub async fn get_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (status, body) = get_inner(&state.pool, id).await;
    (status, Json(body))
}

// ============================================================================
// Unit Tests — inner functions and status mapping
// ============================================================================

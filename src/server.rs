//! JSON HTTP API over the comment store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/comments` | Add a comment from a citation string + text |
//! | `GET`  | `/search?q=&author=&lang=&limit=` | Full-text search with filters |
//! | `GET`  | `/range?ref=` | Records overlapping the citation; `Jn 1` scans the chapter |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Errors are always a JSON object, never a stack trace:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "unparsable reference: xyz" } }
//! ```
//!
//! Malformed input → 400, backend failure → 500.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted; the original deployment
//! serves a static browser frontend from a different origin.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::db;
use crate::models::{CommentRecord, RawExtraction};
use crate::query::split_languages;
use crate::record;
use crate::reference::{parse_range_query, parse_reference};
use crate::store;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pool: SqlitePool,
}

/// Starts the HTTP server on the address configured in `[server].bind`.
/// Runs until the process is terminated.
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
        .route("/comments", post(handle_add))
        .route("/search", get(handle_search))
        .route("/range", get(handle_range))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("glosa server listening on http://{}", bind_addr);

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

fn internal(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
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

// ============ POST /comments ============

#[derive(Deserialize)]
struct AddRequest {
    /// Citation string, e.g. "Jn 1,10-18".
    reference: String,
    comment: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Serialize)]
struct AddResponse {
    saved: CommentRecord,
    duplicate: bool,
}

/// Adds one comment. The citation and the comment text form the fingerprint,
/// so posting the same pair twice stores a single record; the response flags
/// the duplicate instead of failing.
async fn handle_add(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<Json<AddResponse>, AppError> {
    if req.comment.trim().is_empty() {
        return Err(bad_request("comment must not be empty"));
    }

    let reference = parse_reference(&req.reference).map_err(|e| bad_request(e.to_string()))?;

    let language = req
        .language
        .unwrap_or_else(|| state.config.ingest.language.clone());
    let raw = RawExtraction {
        subject: req.reference.clone(),
        title: String::new(),
        comment: req.comment.clone(),
        body: req.comment,
        author: req.author,
        date: None,
    };
    let rec = record::build(&raw, &reference, &language);

    let written = store::put_if_absent(&state.pool, &rec)
        .await
        .map_err(internal)?;

    Ok(Json(AddResponse {
        saved: rec,
        duplicate: !written,
    }))
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CommentRecord>>, AppError> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| bad_request("Missing ?q parameter"))?;

    let languages = split_languages(params.lang.as_deref());
    let limit = params.limit.unwrap_or(20).clamp(1, 200);

    let results = store::search_comments(
        &state.pool,
        query,
        params.author.as_deref(),
        &languages,
        limit,
    )
    .await
    .map_err(internal)?;

    Ok(Json(results))
}

// ============ GET /range ============

#[derive(Deserialize)]
struct RangeParams {
    #[serde(default)]
    r#ref: Option<String>,
}

async fn handle_range(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<CommentRecord>>, AppError> {
    let reference = params
        .r#ref
        .as_deref()
        .ok_or_else(|| bad_request("Missing ?ref parameter"))?;

    let target = parse_range_query(reference).map_err(|e| bad_request(e.to_string()))?;

    let results = store::query_range(&state.pool, &target)
        .await
        .map_err(internal)?;

    Ok(Json(results))
}

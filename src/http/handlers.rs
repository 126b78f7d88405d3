/// Request handlers for the service endpoints.
///
/// Every failure is converted to a structured JSON error payload at this
/// boundary; nothing here is fatal to the running process.
use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::engine::{Answer, EngineError};
use crate::http::server::AppState;
use crate::ingest::UploadedFile;

/// Errors surfaced to HTTP callers, mapped to a kind-appropriate status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("vector store failed: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Engine(EngineError::Generation(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "error",
            "error": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

/// `GET /` — redirect to the frontend page.
pub async fn root() -> Redirect {
    Redirect::to("/static/index.html")
}

/// `GET /health` — liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /upload` — accept a multipart file batch and rebuild the index.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart payload: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read {name}: {e}")))?;
        files.push(UploadedFile {
            name,
            data: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("no files in upload".to_string()));
    }

    let report = state.ingestor.ingest(files).await?;

    Ok(Json(json!({
        "status": "success",
        "files": report.files,
        "chunks": report.chunks,
        "errors": report.errors,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AskParams {
    pub query: Option<String>,
}

/// `POST /ask?query=...` — answer a question from the indexed documents.
pub async fn ask(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
) -> Result<Json<Answer>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("query parameter is required".to_string()))?;

    let answer = state.engine.answer(query).await?;
    Ok(Json(answer))
}

/// `GET /status` — indexed entry count and readiness flag.
pub async fn status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let db = state.db.lock().await;
    let indexed = db.count_entries()?;

    Ok(Json(json!({
        "indexed_documents": indexed,
        "status": "ready",
    })))
}

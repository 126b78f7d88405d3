/// HTTP server setup: router, shared state, middleware, graceful shutdown.
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::sync::Mutex as TokioMutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::Db;
use crate::engine::AnswerEngine;
use crate::http::handlers;
use crate::ingest::Ingestor;

/// Uploads are capped well above any reasonable document batch.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Shared application state available to all request handlers.
///
/// The vector store sits behind one async mutex; an upload's
/// clear-and-repopulate swap holds it for the whole batch, so queries
/// queue rather than racing a partially rebuilt index.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<TokioMutex<Db>>,
    pub engine: Arc<AnswerEngine>,
    pub ingestor: Arc<Ingestor>,
}

/// Build the application router.
pub fn router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload))
        .route("/ask", post(handlers::ask))
        .route("/status", get(handlers::status))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: AppState, bind_addr: &str, static_dir: &str) -> Result<()> {
    let app = router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!("Listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
    }
}

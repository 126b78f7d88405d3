use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex as TokioMutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ragserve::chunker::TextSplitter;
use ragserve::config::Config;
use ragserve::db::Db;
use ragserve::embedder::{Embedder, download, onnx::OnnxEmbedder};
use ragserve::engine::AnswerEngine;
use ragserve::http::server::{self, AppState};
use ragserve::ingest::Ingestor;
use ragserve::llm::ChatClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting ragserve...");

    // 1. Load config
    let config = Config::load("config.json")?;
    config.validate()?;

    // 2. Ensure the embedding model is available (one-time download)
    let model_dir = download::default_model_dir();
    {
        let dir = model_dir.clone();
        tokio::task::spawn_blocking(move || download::download_model_files(&dir))
            .await
            .context("model download task panicked")??;
    }

    // 3. Init embedder
    let embedder: Arc<dyn Embedder> =
        Arc::new(OnnxEmbedder::new(&model_dir).context("failed to load embedding model")?);

    // 4. Open vector store
    if let Some(parent) = Path::new(&config.db_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db = Db::open(&config.db_path).context("failed to open vector store")?;
    let db = Arc::new(TokioMutex::new(db));

    // 5. Wire the pipeline
    let llm = ChatClient::new(
        config.api_key.clone(),
        config.llm.model.clone(),
        config.llm.temperature,
    )?
    .with_base_url(config.llm.base_url.clone());

    let engine = Arc::new(
        AnswerEngine::new(db.clone(), embedder.clone(), llm).with_top_k(config.search_top_k),
    );
    let ingestor = Arc::new(Ingestor::new(
        db.clone(),
        embedder,
        TextSplitter::new(config.chunk_size, config.chunk_overlap),
    ));

    // 6. Serve
    let state = AppState {
        db,
        engine,
        ingestor,
    };
    server::serve(state, &config.bind_addr, &config.static_dir).await
}

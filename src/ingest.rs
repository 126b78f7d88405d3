//! Upload pipeline: load, chunk, embed, and swap the index.
//!
//! Each upload batch fully replaces the previous index contents. Loading,
//! chunking, and embedding run before the store lock is taken; the
//! clear-and-repopulate swap happens under a single guard, so concurrent
//! queries queue behind it and never observe a half-rebuilt index.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex as TokioMutex;
use tracing::{info, warn};

use crate::chunker::{Chunk, TextSplitter};
use crate::db::Db;
use crate::embedder::{Embedder, EmbedderError};
use crate::loader::{self, LoaderError};

/// An uploaded file: original filename plus raw bytes.
pub struct UploadedFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Why a single file was skipped during ingest.
#[derive(Error, Debug)]
enum IngestError {
    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedderError),
}

/// A per-file ingest failure, reported back to the uploader.
#[derive(Debug, Serialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Outcome of an upload batch.
#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    /// Files successfully processed (including ones yielding zero chunks).
    pub files: usize,
    /// Total chunks indexed across the batch.
    pub chunks: usize,
    /// Files skipped, with the reason. Never aborts the batch.
    pub errors: Vec<FileError>,
}

/// Prepared per-file index data, built outside the store lock.
struct PreparedDocument {
    name: String,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

/// Ingest pipeline over the shared vector store.
pub struct Ingestor {
    db: Arc<TokioMutex<Db>>,
    embedder: Arc<dyn Embedder>,
    splitter: TextSplitter,
}

impl Ingestor {
    pub fn new(db: Arc<TokioMutex<Db>>, embedder: Arc<dyn Embedder>, splitter: TextSplitter) -> Self {
        Self {
            db,
            embedder,
            splitter,
        }
    }

    /// Process an upload batch and replace the index with its contents.
    ///
    /// Per-file failures are recorded in the report and skipped; a store
    /// failure during the swap is returned as the error.
    pub async fn ingest(&self, files: Vec<UploadedFile>) -> Result<IngestReport, rusqlite::Error> {
        let mut report = IngestReport::default();
        let mut batch = Vec::new();

        for file in files {
            match self.prepare(&file) {
                Ok(doc) => {
                    report.files += 1;
                    report.chunks += doc.chunks.len();
                    batch.push(doc);
                }
                Err(e) => {
                    warn!("Skipping {}: {e}", file.name);
                    report.errors.push(FileError {
                        file: file.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        // Swap: prior contents are always dropped, even if nothing new
        // indexed, so the store only ever reflects the latest batch.
        let mut db = self.db.lock().await;
        let removed = db.clear()?;
        for doc in &batch {
            if doc.chunks.is_empty() {
                continue;
            }
            let db_chunks: Vec<crate::db::models::Chunk> = doc
                .chunks
                .iter()
                .map(|c| crate::db::models::Chunk {
                    position: c.position,
                    content: c.content.as_str(),
                })
                .collect();
            db.insert_document(&doc.name, &db_chunks, &doc.vectors)?;
        }

        info!(
            "Indexed {} chunks from {} files (replaced {removed} entries)",
            report.chunks, report.files
        );

        Ok(report)
    }

    fn prepare(&self, file: &UploadedFile) -> Result<PreparedDocument, IngestError> {
        let blocks = loader::extract_blocks(&file.name, &file.data)?;
        let chunks = self.splitter.split_blocks(&blocks);

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;

        Ok(PreparedDocument {
            name: file.name.clone(),
            chunks,
            vectors,
        })
    }
}

//! Answering engine: retrieval plus grounded generation.
//!
//! Embeds a question, retrieves the top-k nearest chunks from the vector
//! store, and asks the generative model to answer from that context. The
//! retrieved chunks' metadata is returned as the answer's cited sources.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex as TokioMutex;

use crate::db::Db;
use crate::db::search::SearchResult;
use crate::embedder::{Embedder, EmbedderError};
use crate::llm::{ChatClient, LlmError};

/// Default number of chunks retrieved as context per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Errors from the question-answering pipeline, discriminated by stage.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedderError),

    #[error("vector store failed: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
}

/// Metadata of a chunk used as grounding context.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub source: String,
    pub chunk_id: usize,
}

/// A generated answer with the sources it was grounded on.
#[derive(Debug, Serialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Question-answering engine over the shared vector store.
pub struct AnswerEngine {
    db: Arc<TokioMutex<Db>>,
    embedder: Arc<dyn Embedder>,
    llm: ChatClient,
    top_k: usize,
}

impl AnswerEngine {
    pub fn new(db: Arc<TokioMutex<Db>>, embedder: Arc<dyn Embedder>, llm: ChatClient) -> Self {
        Self {
            db,
            embedder,
            llm,
            top_k: DEFAULT_TOP_K,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer a question from the indexed documents.
    ///
    /// An empty index is not an error: generation runs with no grounding
    /// context and the returned `sources` list is empty.
    pub async fn answer(&self, question: &str) -> Result<Answer, EngineError> {
        let query_vector = self.embedder.embed(question)?;

        let hits = {
            let db = self.db.lock().await;
            db.search(&query_vector, self.top_k)?
        };

        let prompt = build_prompt(question, &hits);
        let answer = self.llm.complete(&prompt).await?;

        let sources = hits
            .iter()
            .map(|hit| SourceRef {
                source: hit.document_name.clone(),
                chunk_id: hit.position,
            })
            .collect();

        Ok(Answer {
            question: question.to_string(),
            answer,
            sources,
        })
    }
}

/// Build a stuff-style prompt: retrieved context ahead of the question.
fn build_prompt(question: &str, hits: &[SearchResult]) -> String {
    let mut prompt = String::from(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, \
         don't try to make up an answer.\n\n",
    );

    for hit in hits {
        prompt.push_str(&hit.chunk_content);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Question: ");
    prompt.push_str(question);
    prompt.push_str("\nHelpful Answer:");
    prompt
}

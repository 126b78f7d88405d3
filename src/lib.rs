//! # ragserve — Retrieval-Augmented Question Answering Service
//!
//! HTTP service that indexes uploaded PDF/TXT documents into a local vector
//! store and answers natural-language questions by retrieving relevant
//! chunks and feeding them as context to a hosted chat-completion model,
//! citing sources.
//!
//! ## Architecture
//!
//! - **[`config`]** — Configuration loading, validation, environment API key
//! - **[`loader`]** — PDF/TXT text extraction from uploaded bytes
//! - **[`chunker`]** — Recursive character splitting with overlap
//! - **[`embedder`]** — Text embedding via ONNX Runtime (multilingual MiniLM)
//! - **[`db`]** — SQLite + sqlite-vec vector store (insert, top-k search, clear)
//! - **[`llm`]** — Chat-completion client for the hosted generative model
//! - **[`ingest`]** — Upload pipeline: load → chunk → embed → swap the index
//! - **[`engine`]** — Answering engine: retrieve top-k, generate, cite sources
//! - **[`http`]** — axum service facade (upload / ask / status / health)

pub mod chunker;
pub mod config;
pub mod db;
pub mod embedder;
pub mod engine;
pub mod http;
pub mod ingest;
pub mod llm;
pub mod loader;

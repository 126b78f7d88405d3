/// End-to-end integration tests for the ragserve pipeline.
///
/// Tests the complete flow:
///   Upload batch → Loader → Chunker → Embedder → Vector Store → Search,
/// plus the answering engine against a mocked generative model.
use std::sync::Arc;

use ragserve::chunker::TextSplitter;
use ragserve::config::Config;
use ragserve::db::Db;
use ragserve::embedder::Embedder;
use ragserve::embedder::mock::MockEmbedder;
use ragserve::engine::AnswerEngine;
use ragserve::ingest::{Ingestor, UploadedFile};
use ragserve::llm::ChatClient;
use serde_json::json;
use tokio::sync::Mutex as TokioMutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn txt(name: &str, content: &str) -> UploadedFile {
    UploadedFile {
        name: name.to_string(),
        data: content.as_bytes().to_vec(),
    }
}

fn test_ingestor(db: &Arc<TokioMutex<Db>>, embedder: &Arc<MockEmbedder>) -> Ingestor {
    Ingestor::new(
        db.clone(),
        embedder.clone() as Arc<dyn Embedder>,
        TextSplitter::new(500, 50),
    )
}

/// Full pipeline: upload → search returns only current-batch content.
#[tokio::test]
async fn test_upload_and_search_pipeline() {
    let db = Arc::new(TokioMutex::new(Db::open_in_memory().unwrap()));
    let embedder = Arc::new(MockEmbedder::default());
    let ingestor = test_ingestor(&db, &embedder);

    // Batch 1: two documents
    let report = ingestor
        .ingest(vec![
            txt(
                "rust.txt",
                "Rust is a systems programming language focused on safety and performance.",
            ),
            txt(
                "guide.txt",
                "To get started: install dependencies, run the server, open the frontend.",
            ),
        ])
        .await
        .unwrap();

    assert_eq!(report.files, 2);
    assert!(report.errors.is_empty());
    assert!(report.chunks >= 2);

    {
        let db = db.lock().await;
        assert_eq!(db.count_documents().unwrap(), 2);

        let query = embedder.embed("Rust programming").unwrap();
        let results = db.search(&query, 5).unwrap();
        assert!(!results.is_empty());
        for r in &results {
            assert!(!r.document_name.is_empty());
            assert!(!r.chunk_content.is_empty());
            assert!(r.similarity >= -1.0 && r.similarity <= 1.0);
        }
        // Nearest-first ordering
        for pair in results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    // Batch 2 fully replaces batch 1
    ingestor
        .ingest(vec![txt("fresh.txt", "Entirely new content replaces the old.")])
        .await
        .unwrap();

    let db = db.lock().await;
    assert_eq!(db.list_documents().unwrap(), vec!["fresh.txt"]);

    let query = embedder.embed("anything").unwrap();
    let results = db.search(&query, 10).unwrap();
    assert!(results.iter().all(|r| r.document_name == "fresh.txt"));
}

/// A corrupt file in a batch is reported and skipped; siblings still index.
#[tokio::test]
async fn test_partial_failure_keeps_batch_going() {
    let db = Arc::new(TokioMutex::new(Db::open_in_memory().unwrap()));
    let embedder = Arc::new(MockEmbedder::default());
    let ingestor = test_ingestor(&db, &embedder);

    let report = ingestor
        .ingest(vec![
            UploadedFile {
                name: "corrupt.pdf".to_string(),
                data: vec![0x00, 0x01, 0x02],
            },
            txt("valid.txt", "This one is fine."),
            txt("empty.txt", ""),
        ])
        .await
        .unwrap();

    // corrupt.pdf fails; valid.txt and empty.txt are processed
    assert_eq!(report.files, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].file, "corrupt.pdf");

    let db = db.lock().await;
    assert_eq!(db.list_documents().unwrap(), vec!["valid.txt"]);
}

/// 1200-character upload with chunk size 500 / overlap 50 → 3 chunks,
/// each within the limit, consecutive chunks overlapping.
#[tokio::test]
async fn test_chunking_scenario_through_pipeline() {
    let db = Arc::new(TokioMutex::new(Db::open_in_memory().unwrap()));
    let embedder = Arc::new(MockEmbedder::default());
    let ingestor = test_ingestor(&db, &embedder);

    let content = "word ".repeat(240);
    assert_eq!(content.len(), 1200);

    let report = ingestor.ingest(vec![txt("long.txt", &content)]).await.unwrap();
    assert_eq!(report.chunks, 3);

    let db = db.lock().await;
    let query = embedder.embed("word").unwrap();
    let results = db.search(&query, 10).unwrap();
    assert_eq!(results.len(), 3);
    for r in &results {
        assert!(r.chunk_content.chars().count() <= 500);
    }
}

/// Asking against an empty index generates an answer with no sources.
#[tokio::test]
async fn test_ask_with_empty_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "I don't know."}}]
        })))
        .mount(&server)
        .await;

    let llm = ChatClient::new(Some("test-key".to_string()), "gpt-3.5-turbo", 0.7)
        .unwrap()
        .with_base_url(server.uri());

    let db = Arc::new(TokioMutex::new(Db::open_in_memory().unwrap()));
    let engine = AnswerEngine::new(db, Arc::new(MockEmbedder::default()), llm);

    let answer = engine.answer("What is X?").await.unwrap();
    assert_eq!(answer.question, "What is X?");
    assert_eq!(answer.answer, "I don't know.");
    assert!(answer.sources.is_empty());
}

/// Uploading then asking returns the uploaded document among the sources.
#[tokio::test]
async fn test_upload_then_ask_cites_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "A systems language."}}]
        })))
        .mount(&server)
        .await;

    let llm = ChatClient::new(Some("test-key".to_string()), "gpt-3.5-turbo", 0.7)
        .unwrap()
        .with_base_url(server.uri());

    let db = Arc::new(TokioMutex::new(Db::open_in_memory().unwrap()));
    let embedder = Arc::new(MockEmbedder::default());
    let ingestor = test_ingestor(&db, &embedder);

    ingestor
        .ingest(vec![txt("rust.txt", "Rust is a systems programming language.")])
        .await
        .unwrap();

    let engine = AnswerEngine::new(db, embedder as Arc<dyn Embedder>, llm);
    let answer = engine.answer("What is Rust?").await.unwrap();

    assert_eq!(answer.answer, "A systems language.");
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].source, "rust.txt");
    assert_eq!(answer.sources[0].chunk_id, 0);
}

/// Test config defaults and validation
#[test]
fn test_config_defaults_and_validation() {
    let config = Config::default();

    assert_eq!(config.chunk_size, 500);
    assert_eq!(config.chunk_overlap, 50);
    assert_eq!(config.search_top_k, 3);
    assert_eq!(config.model.dimensions, 384);
    assert!(config.validate().is_ok());

    // Invalid config
    let mut bad_config = Config::default();
    bad_config.chunk_size = 0;
    assert!(bad_config.validate().is_err());
}

//! Tests for the ingest and answer flows against the local store.

use crate::embeddings::{EmbeddingProvider, MockProvider};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::source::{fixtures, PdfSource, TextSource};
use crate::types::{IndexEntry, IndexStats, QueryMatch, RetrievalOutcome, NO_MATCH_ANSWER};
use crate::vector_store::{SqliteStore, VectorStore};
use crate::DistanceMetric;
use async_trait::async_trait;
use pdfqa_core::{AppError, AppResult, ChunkSettings};
use pdfqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const DIMS: usize = 64;

/// Completion client that records every request.
#[derive(Default)]
struct RecordingLlm {
    requests: Mutex<Vec<LlmRequest>>,
}

impl RecordingLlm {
    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_prompt(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.prompt.clone())
    }
}

#[async_trait]
impl LlmClient for RecordingLlm {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(LlmResponse {
            content: "Twenty days.".to_string(),
            model: request.model.clone(),
            usage: LlmUsage::new(10, 3),
        })
    }
}

#[derive(Debug)]
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> Option<usize> {
        None
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::Embedding("quota exceeded".to_string()))
    }
}

/// Store whose matches carry no metadata, as when entries were written by another tool.
struct BareMatchStore;

#[async_trait]
impl VectorStore for BareMatchStore {
    fn backend_name(&self) -> &str {
        "bare"
    }

    async fn ensure_index(&self, _name: &str, _dimension: usize, _metric: DistanceMetric) -> AppResult<()> {
        Ok(())
    }

    async fn upsert(&self, _index: &str, entries: &[IndexEntry]) -> AppResult<usize> {
        Ok(entries.len())
    }

    async fn query(&self, _index: &str, _vector: &[f32], _top_k: usize) -> AppResult<Vec<QueryMatch>> {
        Ok(vec![QueryMatch {
            id: "id0".to_string(),
            score: 0.91,
            metadata: None,
        }])
    }

    async fn delete_index(&self, _name: &str) -> AppResult<()> {
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> AppResult<IndexStats> {
        Ok(IndexStats {
            name: name.to_string(),
            dimension: DIMS,
            metric: DistanceMetric::Cosine,
            vector_count: 1,
        })
    }
}

struct StaticSource(String);

#[async_trait]
impl TextSource for StaticSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    async fn load_text(&self) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

fn options() -> PipelineOptions {
    PipelineOptions {
        index_name: "regqa".to_string(),
        chunking: ChunkSettings::new(10_000, 5_000).unwrap(),
        completion_model: "gpt-3.5-turbo-instruct".to_string(),
        max_tokens: 400,
        top_k: 1,
    }
}

fn pipeline_with(
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<SqliteStore>,
    llm: Arc<RecordingLlm>,
) -> Pipeline {
    Pipeline::new(embedder, store, llm, options()).unwrap()
}

fn setup() -> (Pipeline, Arc<SqliteStore>, Arc<RecordingLlm>) {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let llm = Arc::new(RecordingLlm::default());
    let pipeline = pipeline_with(Arc::new(MockProvider::new(DIMS)), store.clone(), llm.clone());
    (pipeline, store, llm)
}

/// 5000 chars about leave followed by 7000 chars about parking.
fn handbook_text() -> String {
    let leave = "annual leave days ".repeat(300);
    let parking = "parking permit garage ".repeat(400);
    format!("{}{}", &leave[..5000], &parking[..7000])
}

#[tokio::test]
async fn test_empty_index_returns_sentinel_without_completion() {
    let (pipeline, store, llm) = setup();
    store.ensure_index("regqa", DIMS, DistanceMetric::Cosine).await.unwrap();

    let outcome = pipeline.retrieve("anything").await.unwrap();
    assert_eq!(outcome, RetrievalOutcome::NoMatch);

    let answer = pipeline.answer("anything").await.unwrap();
    assert_eq!(answer.answer, NO_MATCH_ANSWER);
    assert!(!answer.matched);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_ingest_then_answer_uses_best_chunk() {
    let (pipeline, store, llm) = setup();
    let text = handbook_text();

    let stats = pipeline.ingest(&StaticSource(text.clone())).await.unwrap();
    assert_eq!(stats.chars_extracted, 12_000);
    assert_eq!(stats.chunks_count, 2);
    assert_eq!(stats.entries_upserted, 2);
    assert_eq!(stats.dimension, DIMS);
    assert_eq!(store.describe_index("regqa").await.unwrap().vector_count, 2);

    let answer = pipeline.answer("How many annual leave days?").await.unwrap();
    assert!(answer.matched);
    assert_eq!(answer.answer, "Twenty days.");
    assert_eq!(answer.match_id.as_deref(), Some("id0"));
    assert_eq!(answer.context.as_deref(), Some(&text[..10_000]));

    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.starts_with("Answer the question based on the context below.\n\nContext:\n"));
    assert!(prompt.ends_with("\n\nQuestion: How many annual leave days?\n\nAnswer:"));
    assert!(prompt.contains(&text[..10_000]));

    let request = llm.requests.lock().unwrap()[0].clone();
    assert_eq!(request.max_tokens, Some(400));
    assert_eq!(request.temperature, Some(0.0));
}

#[tokio::test]
async fn test_empty_text_fails_before_any_remote_call() {
    let (pipeline, store, _llm) = setup();

    let err = pipeline.ingest(&StaticSource(String::new())).await.unwrap_err();
    assert!(matches!(err, AppError::Extraction(_)));
    assert!(err.to_string().contains("No text to ingest"));

    // The index was never created
    assert!(store.describe_index("regqa").await.is_err());
}

#[tokio::test]
async fn test_embedding_failure_aborts_ingest() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let llm = Arc::new(RecordingLlm::default());
    let pipeline = pipeline_with(Arc::new(FailingEmbedder), store.clone(), llm.clone());

    let err = pipeline.ingest(&StaticSource("some text".to_string())).await.unwrap_err();
    assert!(matches!(err, AppError::Embedding(_)));
    assert!(store.describe_index("regqa").await.is_err());

    assert!(pipeline.answer("question").await.is_err());
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_match_without_text_is_error_not_empty_context() {
    let llm = Arc::new(RecordingLlm::default());
    let pipeline = Pipeline::new(
        Arc::new(MockProvider::new(DIMS)),
        Arc::new(BareMatchStore),
        llm.clone(),
        options(),
    )
    .unwrap();

    let err = pipeline.retrieve("How many annual leave days?").await.unwrap_err();
    assert!(matches!(err, AppError::VectorStore(_)));
    assert!(err.to_string().contains("Match id0 has no text metadata"));

    assert!(pipeline.answer("How many annual leave days?").await.is_err());
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_reingest_overwrites_ids_and_keeps_stale_tail() {
    let (pipeline, store, _llm) = setup();
    pipeline.ingest(&StaticSource(handbook_text())).await.unwrap();

    // One chunk this time: id0 is overwritten, id1 remains from the first run
    pipeline.ingest(&StaticSource("short policy".to_string())).await.unwrap();
    assert_eq!(store.describe_index("regqa").await.unwrap().vector_count, 2);

    let answer = pipeline.answer("short policy").await.unwrap();
    assert_eq!(answer.context.as_deref(), Some("short policy"));
}

#[tokio::test]
async fn test_teardown_deletes_index() {
    let (pipeline, _store, _llm) = setup();
    pipeline.ingest(&StaticSource(handbook_text())).await.unwrap();
    assert_eq!(pipeline.stats().await.unwrap().vector_count, 2);

    pipeline.teardown().await.unwrap();
    assert!(pipeline.stats().await.is_err());
}

#[tokio::test]
async fn test_concurrent_answers_share_one_pipeline() {
    let (pipeline, _store, llm) = setup();
    pipeline.ingest(&StaticSource(handbook_text())).await.unwrap();
    let pipeline = Arc::new(pipeline);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.answer(&format!("leave question {}", i)).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap().matched);
    }
    assert_eq!(llm.calls(), 8);
}

#[tokio::test]
async fn test_pdf_ingest_and_record() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("handbook.pdf");
    fixtures::write_pdf(&path, &["Employees receive twenty annual leave days", "Parking is free"]);

    let (pipeline, _store, _llm) = setup();
    let source = PdfSource::new(&path);
    let stats = pipeline.ingest(&source).await.unwrap();
    assert_eq!(stats.chunks_count, 1);

    let record = pipeline.index_record(&stats);
    assert_eq!(record.index_name, "regqa");
    assert_eq!(record.backend, "sqlite");
    assert_eq!(record.embedding_model, "trigram-v1");
    assert_eq!(record.dimension, DIMS);

    let answer = pipeline.answer("How many annual leave days?").await.unwrap();
    assert!(answer.context.unwrap().contains("twenty annual leave days"));
}

#[test]
fn test_invalid_options_rejected() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let llm = Arc::new(RecordingLlm::default());

    let mut opts = options();
    opts.top_k = 0;
    assert!(Pipeline::new(Arc::new(MockProvider::new(DIMS)), store, llm, opts).is_err());
}

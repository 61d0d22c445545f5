//! Ingest and question-answering orchestration.

use crate::chunker::chunk_with;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::registry::IndexRecord;
use crate::source::TextSource;
use crate::types::{
    Answer, DistanceMetric, IndexEntry, IndexStats, IngestStats, RetrievalOutcome,
};
use crate::vector_store::{create_store, VectorStore};
use chrono::Utc;
use pdfqa_core::{AppConfig, AppError, AppResult, ChunkSettings};
use pdfqa_llm::{create_client, LlmClient, LlmRequest};
use pdfqa_prompt::build_prompt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::OwnedMutexGuard;

/// One async mutex per index name.
#[derive(Debug, Default)]
pub struct IndexLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl IndexLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `index`.
    pub async fn acquire(&self, index: &str) -> AppResult<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| AppError::Other("Index lock table poisoned".to_string()))?;
            locks
                .entry(index.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        Ok(lock.lock_owned().await)
    }
}

/// Settings the pipeline needs besides its three services.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub index_name: String,
    pub chunking: ChunkSettings,
    pub completion_model: String,
    pub max_tokens: u32,
    pub top_k: usize,
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            index_name: config.vector_store.index_name.clone(),
            chunking: config.chunking,
            completion_model: config.completion.model.clone(),
            max_tokens: config.completion.max_tokens,
            top_k: config.top_k,
        }
    }
}

pub struct Pipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmClient>,
    options: PipelineOptions,
    locks: IndexLocks,
}

impl Pipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmClient>,
        options: PipelineOptions,
    ) -> AppResult<Self> {
        options.chunking.validate()?;
        if options.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        Ok(Self {
            embedder,
            store,
            llm,
            options,
            locks: IndexLocks::new(),
        })
    }

    /// Build every service from configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        let timeout = config.request_timeout_secs.map(Duration::from_secs);

        let embedder =
            create_provider(&config.embedding, config.openai_api_key.as_deref(), timeout)?;
        let store = create_store(
            &config.vector_store,
            config.pinecone_api_key.as_deref(),
            &config.vector_db_path(),
            timeout,
        )?;
        let llm = create_client(
            &config.completion.provider,
            config.completion.endpoint.as_deref(),
            config.openai_api_key.as_deref(),
            timeout,
        )
        .map_err(|e| AppError::Config(format!("Failed to create completion client: {}", e)))?;

        tracing::debug!(
            embedder = embedder.provider_name(),
            store = store.backend_name(),
            llm = llm.provider_name(),
            "Pipeline ready"
        );

        Self::new(embedder, store, llm, PipelineOptions::from_config(config))
    }

    pub fn index_name(&self) -> &str {
        &self.options.index_name
    }

    /// Extract, chunk, embed and store `source` in the index.
    ///
    /// Entries are written as `id0..idN`, overwriting any previous entries
    /// with the same ids. A failure part way leaves earlier writes in place.
    pub async fn ingest(&self, source: &dyn TextSource) -> AppResult<IngestStats> {
        let start = Instant::now();
        let index = self.options.index_name.as_str();
        let _guard = self.locks.acquire(index).await?;

        tracing::info!("Ingesting {} into '{}'", source.describe(), index);

        let text = source.load_text().await?;
        let chunks = chunk_with(&text, &self.options.chunking);
        if chunks.is_empty() {
            return Err(AppError::Extraction("No text to ingest".to_string()));
        }
        let chars_extracted = text.chars().count();
        tracing::debug!("Split {} chars into {} chunks", chars_extracted, chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or_default();
        if dimension == 0 {
            return Err(AppError::Embedding("Embedding provider returned empty vectors".to_string()));
        }

        self.store
            .ensure_index(index, dimension, DistanceMetric::Cosine)
            .await?;

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| IndexEntry::from_chunk(chunk, values))
            .collect();
        let entries_upserted = self.store.upsert(index, &entries).await?;

        let stats = IngestStats {
            index_name: index.to_string(),
            source: source.describe(),
            chars_extracted,
            chunks_count: chunks.len(),
            entries_upserted,
            dimension,
            duration_secs: start.elapsed().as_secs_f64(),
        };

        tracing::info!(
            "Ingested {} chunks into '{}' in {:.2}s",
            stats.chunks_count,
            index,
            stats.duration_secs
        );
        Ok(stats)
    }

    /// Find the best-matching chunk for `query` and build the prompt from it.
    pub async fn retrieve(&self, query: &str) -> AppResult<RetrievalOutcome> {
        let index = self.options.index_name.as_str();
        let _guard = self.locks.acquire(index).await?;

        let vector = self.embedder.embed(query).await?;
        let matches = self.store.query(index, &vector, self.options.top_k).await?;

        let Some(best) = matches.into_iter().next() else {
            tracing::info!("No matches in '{}' for query", index);
            return Ok(RetrievalOutcome::NoMatch);
        };

        let context = best
            .text()
            .ok_or_else(|| AppError::VectorStore(format!("Match {} has no text metadata", best.id)))?
            .to_string();
        let prompt = build_prompt(&context, query)?;

        tracing::debug!(id = %best.id, score = best.score, "Best match");
        Ok(RetrievalOutcome::Context {
            id: best.id,
            score: best.score,
            context,
            prompt,
        })
    }

    /// Answer `query` from the index. Completion is skipped when nothing matches.
    pub async fn answer(&self, query: &str) -> AppResult<Answer> {
        match self.retrieve(query).await? {
            RetrievalOutcome::NoMatch => Ok(Answer::no_information()),
            RetrievalOutcome::Context {
                id,
                score,
                context,
                prompt,
            } => {
                let request = LlmRequest::deterministic(
                    prompt,
                    self.options.completion_model.clone(),
                    self.options.max_tokens,
                );
                let response = self.llm.complete(&request).await?;

                Ok(Answer {
                    answer: response.content,
                    matched: true,
                    match_id: Some(id),
                    score: Some(score),
                    context: Some(context),
                })
            }
        }
    }

    /// Delete the index and all its entries.
    pub async fn teardown(&self) -> AppResult<()> {
        let index = self.options.index_name.as_str();
        let _guard = self.locks.acquire(index).await?;
        self.store.delete_index(index).await
    }

    pub async fn stats(&self) -> AppResult<IndexStats> {
        self.store.describe_index(&self.options.index_name).await
    }

    /// Record describing a completed ingest, for later runs to find the index.
    pub fn index_record(&self, stats: &IngestStats) -> IndexRecord {
        IndexRecord {
            index_name: stats.index_name.clone(),
            backend: self.store.backend_name().to_string(),
            dimension: stats.dimension,
            metric: DistanceMetric::Cosine,
            embedding_model: self.embedder.model_name().to_string(),
            source: stats.source.clone(),
            chunk_count: stats.chunks_count,
            ingested_at: Utc::now(),
        }
    }
}

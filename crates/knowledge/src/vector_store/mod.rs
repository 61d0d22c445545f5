//! Vector index backends.
//!
//! Both backends expose the same contract: idempotent index creation,
//! insert-or-overwrite by id, top-k similarity query, and index deletion.

pub mod pinecone;
pub mod sqlite;

pub use pinecone::PineconeStore;
pub use sqlite::SqliteStore;

use crate::types::{DistanceMetric, IndexEntry, IndexStats, QueryMatch};
use async_trait::async_trait;
use pdfqa_core::config::VectorStoreSettings;
use pdfqa_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A named collection of (id, vector, metadata) entries with nearest-neighbor search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Backend identifier ("pinecone", "sqlite").
    fn backend_name(&self) -> &str;

    /// Create the index if it does not exist. Existing indexes are left untouched.
    async fn ensure_index(&self, name: &str, dimension: usize, metric: DistanceMetric) -> AppResult<()>;

    /// Insert or overwrite entries by id. Returns the number written.
    async fn upsert(&self, index: &str, entries: &[IndexEntry]) -> AppResult<usize>;

    /// Top-k entries ranked by the index metric, best first. Empty when the
    /// index holds no entries.
    async fn query(&self, index: &str, vector: &[f32], top_k: usize) -> AppResult<Vec<QueryMatch>>;

    /// Destroy the index and everything in it.
    async fn delete_index(&self, name: &str) -> AppResult<()>;

    /// Dimension, metric and entry count of an existing index.
    async fn describe_index(&self, name: &str) -> AppResult<IndexStats>;
}

/// Create the configured backend.
pub fn create_store(
    settings: &VectorStoreSettings,
    api_key: Option<&str>,
    sqlite_path: &Path,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn VectorStore>> {
    match settings.backend.as_str() {
        "pinecone" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Pinecone backend requires PINECONE_API_KEY".to_string())
            })?;
            let mut store = PineconeStore::new(api_key, &settings.environment);
            if let Some(url) = &settings.controller_url {
                store = store.with_controller_url(url.clone());
            }
            if let Some(url) = &settings.data_url {
                store = store.with_data_url(url.clone());
            }
            if let Some(timeout) = timeout {
                store = store.with_timeout(timeout)?;
            }
            Ok(Arc::new(store))
        }
        "sqlite" => Ok(Arc::new(SqliteStore::open(sqlite_path)?)),
        other => Err(AppError::Config(format!(
            "Unknown vector store backend: '{}'. Supported: pinecone, sqlite",
            other
        ))),
    }
}

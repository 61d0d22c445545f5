//! Pinecone vector store over the legacy REST API.
//!
//! Index management goes to the environment controller
//! (`https://controller.{env}.pinecone.io`), data operations go to the
//! per-index host (`https://{index}-{project}.svc.{env}.pinecone.io`).

use super::VectorStore;
use crate::types::{DistanceMetric, EntryMetadata, IndexEntry, IndexStats, QueryMatch};
use async_trait::async_trait;
use pdfqa_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;

const UPSERT_BATCH_SIZE: usize = 100;
/// Pinecone rejects upsert bodies of 2 MB or more.
const MAX_UPSERT_BYTES: usize = 2_000_000;
/// `{"vectors":[` plus `]}`
const UPSERT_ENVELOPE_BYTES: usize = 14;
const READY_POLL_ATTEMPTS: u32 = 60;

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
}

#[derive(Deserialize)]
struct WhoAmIResponse {
    project_name: String,
}

#[derive(Deserialize)]
struct IndexDescription {
    database: DatabaseInfo,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Deserialize)]
struct DatabaseInfo {
    dimension: usize,
    #[serde(default)]
    metric: Option<String>,
}

#[derive(Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexEntry],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Deserialize)]
struct RawMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<EntryMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: u64,
}

/// Hosted Pinecone index client.
pub struct PineconeStore {
    client: reqwest::Client,
    api_key: String,
    environment: String,
    controller_url: String,
    data_url: Option<String>,
    poll_interval: Duration,
    project_id: OnceCell<String>,
}

/// Split entries into upsert batches bounded by both count and body size.
fn upsert_batches(entries: &[IndexEntry]) -> AppResult<Vec<&[IndexEntry]>> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut size = UPSERT_ENVELOPE_BYTES;

    for (i, entry) in entries.iter().enumerate() {
        let entry_size = serde_json::to_vec(entry)?.len();
        if UPSERT_ENVELOPE_BYTES + entry_size > MAX_UPSERT_BYTES {
            return Err(AppError::VectorStore(format!(
                "Entry '{}' is {} bytes, over the {} byte upsert limit",
                entry.id, entry_size, MAX_UPSERT_BYTES
            )));
        }

        let count = i - start;
        // Entries after the first are preceded by a comma
        let added = if count == 0 { entry_size } else { entry_size + 1 };
        if count == UPSERT_BATCH_SIZE || size + added > MAX_UPSERT_BYTES {
            batches.push(&entries[start..i]);
            start = i;
            size = UPSERT_ENVELOPE_BYTES + entry_size;
        } else {
            size += added;
        }
    }

    if start < entries.len() {
        batches.push(&entries[start..]);
    }
    Ok(batches)
}

impl PineconeStore {
    pub fn new(api_key: impl Into<String>, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            controller_url: format!("https://controller.{}.pinecone.io", environment),
            environment,
            data_url: None,
            poll_interval: Duration::from_secs(2),
            project_id: OnceCell::new(),
        }
    }

    pub fn with_controller_url(mut self, url: impl Into<String>) -> Self {
        self.controller_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send data-plane requests here instead of the derived per-index host.
    pub fn with_data_url(mut self, url: impl Into<String>) -> Self {
        self.data_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Project id for the API key, resolved once via `whoami`.
    pub async fn project_id(&self) -> AppResult<&str> {
        let id = self
            .project_id
            .get_or_try_init(|| async {
                let url = format!("{}/actions/whoami", self.controller_url);
                let whoami: WhoAmIResponse = self.send_json(self.client.get(url)).await?;
                tracing::debug!("Pinecone project: {}", whoami.project_name);
                Ok::<_, AppError>(whoami.project_name)
            })
            .await?;
        Ok(id.as_str())
    }

    async fn data_url(&self, index: &str) -> AppResult<String> {
        if let Some(url) = &self.data_url {
            return Ok(url.clone());
        }
        let project = self.project_id().await?;
        Ok(format!(
            "https://{}-{}.svc.{}.pinecone.io",
            index, project, self.environment
        ))
    }

    async fn list_indexes(&self) -> AppResult<Vec<String>> {
        let url = format!("{}/databases", self.controller_url);
        self.send_json(self.client.get(url)).await
    }

    async fn describe(&self, name: &str) -> AppResult<IndexDescription> {
        let url = format!("{}/databases/{}", self.controller_url, name);
        self.send_json(self.client.get(url)).await
    }

    async fn wait_until_ready(&self, name: &str) -> AppResult<()> {
        for _ in 0..READY_POLL_ATTEMPTS {
            let ready = self
                .describe(name)
                .await?
                .status
                .map(|s| s.ready)
                .unwrap_or(false);
            if ready {
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        Err(AppError::VectorStore(format!(
            "Index '{}' did not become ready",
            name
        )))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        let response = request
            .header("Api-Key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::VectorStore(format!("Request to Pinecone failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VectorStore(format!(
                "Pinecone API error ({}): {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> AppResult<T> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to parse Pinecone response: {}", e)))
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    fn backend_name(&self) -> &str {
        "pinecone"
    }

    async fn ensure_index(&self, name: &str, dimension: usize, metric: DistanceMetric) -> AppResult<()> {
        if self.list_indexes().await?.iter().any(|n| n == name) {
            tracing::debug!("Index '{}' already exists", name);
            return Ok(());
        }

        tracing::info!("Creating Pinecone index '{}' (dimension {}, {})", name, dimension, metric);
        let url = format!("{}/databases", self.controller_url);
        self.send(self.client.post(url).json(&CreateIndexRequest {
            name,
            dimension,
            metric: metric.as_str(),
        }))
        .await?;

        self.wait_until_ready(name).await
    }

    async fn upsert(&self, index: &str, entries: &[IndexEntry]) -> AppResult<usize> {
        let url = format!("{}/vectors/upsert", self.data_url(index).await?);

        let batches = upsert_batches(entries)?;
        tracing::debug!("Upserting {} entries in {} batches", entries.len(), batches.len());

        let mut total = 0;
        for batch in batches {
            let response: UpsertResponse = self
                .send_json(self.client.post(&url).json(&UpsertRequest { vectors: batch }))
                .await?;
            total += response.upserted_count;
        }

        tracing::debug!("Upserted {} entries into '{}'", total, index);
        Ok(total)
    }

    async fn query(&self, index: &str, vector: &[f32], top_k: usize) -> AppResult<Vec<QueryMatch>> {
        let url = format!("{}/query", self.data_url(index).await?);
        let response: QueryResponse = self
            .send_json(self.client.post(url).json(&QueryRequest {
                vector,
                top_k,
                include_metadata: true,
                include_values: false,
            }))
            .await?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    async fn delete_index(&self, name: &str) -> AppResult<()> {
        let url = format!("{}/databases/{}", self.controller_url, name);
        self.send(self.client.delete(url)).await?;
        tracing::info!("Deleted Pinecone index '{}'", name);
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> AppResult<IndexStats> {
        let description = self.describe(name).await?;
        let url = format!("{}/describe_index_stats", self.data_url(name).await?);
        let stats: StatsResponse = self
            .send_json(self.client.post(url).json(&serde_json::json!({})))
            .await?;

        let metric = match description.database.metric {
            Some(m) => m.parse()?,
            None => DistanceMetric::default(),
        };

        Ok(IndexStats {
            name: name.to_string(),
            dimension: description.database.dimension,
            metric,
            vector_count: stats.total_vector_count,
        })
    }
}

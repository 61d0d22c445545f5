//! Persisted record of the most recent ingest.
//!
//! The write path saves which index it populated so later question runs
//! (another process, or the HTTP server) query the same index.

use crate::types::DistanceMetric;
use chrono::{DateTime, Utc};
use pdfqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    pub index_name: String,
    pub backend: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub embedding_model: String,
    /// Human-readable description of what was ingested
    pub source: String,
    pub chunk_count: usize,
    pub ingested_at: DateTime<Utc>,
}

/// Location of the record inside a workspace state directory.
pub fn record_path(state_dir: &Path) -> PathBuf {
    state_dir.join("index.yaml")
}

impl IndexRecord {
    /// Load the record, or `None` when nothing has been ingested yet.
    pub fn load(state_dir: &Path) -> AppResult<Option<Self>> {
        let path = record_path(state_dir);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!("Failed to read index record at {:?}: {}", path, e))
        })?;
        let record: IndexRecord = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse index record at {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded index record for '{}'", record.index_name);
        Ok(Some(record))
    }

    pub fn save(&self, state_dir: &Path) -> AppResult<()> {
        fs::create_dir_all(state_dir).map_err(|e| {
            AppError::Config(format!("Failed to create state directory: {}", e))
        })?;

        let path = record_path(state_dir);
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&path, yaml).map_err(|e| {
            AppError::Config(format!("Failed to write index record to {:?}: {}", path, e))
        })?;

        tracing::debug!("Saved index record for '{}'", self.index_name);
        Ok(())
    }

    /// Forget the record, e.g. after the index was deleted.
    pub fn remove(state_dir: &Path) -> AppResult<()> {
        let path = record_path(state_dir);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

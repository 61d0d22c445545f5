//! SQLite-backed vector store for offline use.
//!
//! Vectors are stored as little-endian f32 blobs and searched by brute force.

use super::VectorStore;
use crate::types::{DistanceMetric, EntryMetadata, IndexEntry, IndexStats, QueryMatch};
use async_trait::async_trait;
use chrono::Utc;
use pdfqa_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::VectorStore(format!("Failed to create store directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::VectorStore(format!("Failed to open SQLite store: {}", e)))?;
        Self::init(conn, db_path)
    }

    /// Store that lives only as long as the value.
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::VectorStore(format!("Failed to open SQLite store: {}", e)))?;
        Self::init(conn, Path::new(":memory:"))
    }

    fn init(conn: Connection, db_path: &Path) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS indexes (
                name TEXT PRIMARY KEY,
                dimension INTEGER NOT NULL,
                metric TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entries (
                index_name TEXT NOT NULL,
                id TEXT NOT NULL,
                embedding BLOB NOT NULL,
                text TEXT NOT NULL,
                PRIMARY KEY (index_name, id),
                FOREIGN KEY (index_name) REFERENCES indexes(name) ON DELETE CASCADE
            );
            "#,
        )
        .map_err(|e| AppError::VectorStore(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Initialized SQLite vector store at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::VectorStore("SQLite connection lock poisoned".to_string()))
    }

    fn index_shape(conn: &Connection, name: &str) -> AppResult<(usize, DistanceMetric)> {
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT dimension, metric FROM indexes WHERE name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| AppError::VectorStore(format!("Failed to look up index: {}", e)))?;

        let (dimension, metric) =
            row.ok_or_else(|| AppError::VectorStore(format!("Index '{}' does not exist", name)))?;
        Ok((dimension as usize, metric.parse()?))
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    async fn ensure_index(&self, name: &str, dimension: usize, metric: DistanceMetric) -> AppResult<()> {
        let conn = self.conn()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO indexes (name, dimension, metric, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, dimension as i64, metric.as_str(), Utc::now().to_rfc3339()],
            )
            .map_err(|e| AppError::VectorStore(format!("Failed to create index: {}", e)))?;

        if inserted > 0 {
            tracing::info!("Created index '{}' (dimension {}, {})", name, dimension, metric);
        } else {
            tracing::debug!("Index '{}' already exists", name);
        }
        Ok(())
    }

    async fn upsert(&self, index: &str, entries: &[IndexEntry]) -> AppResult<usize> {
        let mut conn = self.conn()?;
        let (dimension, _) = Self::index_shape(&conn, index)?;

        let tx = conn
            .transaction()
            .map_err(|e| AppError::VectorStore(format!("Failed to begin transaction: {}", e)))?;

        for entry in entries {
            if entry.values.len() != dimension {
                return Err(AppError::VectorStore(format!(
                    "Vector dimension {} does not match index dimension {}",
                    entry.values.len(),
                    dimension
                )));
            }

            tx.execute(
                "INSERT OR REPLACE INTO entries (index_name, id, embedding, text)
                 VALUES (?1, ?2, ?3, ?4)",
                params![index, entry.id, embedding_to_bytes(&entry.values), entry.metadata.text],
            )
            .map_err(|e| AppError::VectorStore(format!("Failed to upsert '{}': {}", entry.id, e)))?;
        }

        tx.commit()
            .map_err(|e| AppError::VectorStore(format!("Failed to commit upsert: {}", e)))?;

        tracing::debug!("Upserted {} entries into '{}'", entries.len(), index);
        Ok(entries.len())
    }

    async fn query(&self, index: &str, vector: &[f32], top_k: usize) -> AppResult<Vec<QueryMatch>> {
        let conn = self.conn()?;
        let (dimension, metric) = Self::index_shape(&conn, index)?;

        if vector.len() != dimension {
            return Err(AppError::VectorStore(format!(
                "Query dimension {} does not match index dimension {}",
                vector.len(),
                dimension
            )));
        }

        let mut stmt = conn
            .prepare("SELECT id, embedding, text FROM entries WHERE index_name = ?1")
            .map_err(|e| AppError::VectorStore(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![index], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| AppError::VectorStore(format!("Failed to query entries: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let (id, bytes, text) =
                row.map_err(|e| AppError::VectorStore(format!("Failed to read entry: {}", e)))?;
            let values = bytes_to_embedding(&bytes)?;
            results.push(QueryMatch {
                id,
                score: score(metric, vector, &values),
                metadata: Some(EntryMetadata { text }),
            });
        }

        // Euclidean scores are distances: smaller is closer
        match metric {
            DistanceMetric::Euclidean => results.sort_by(|a, b| a.score.total_cmp(&b.score)),
            _ => results.sort_by(|a, b| b.score.total_cmp(&a.score)),
        }
        results.truncate(top_k);

        tracing::debug!("Retrieved {} matches (requested top-{})", results.len(), top_k);
        Ok(results)
    }

    async fn delete_index(&self, name: &str) -> AppResult<()> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM indexes WHERE name = ?1", params![name])
            .map_err(|e| AppError::VectorStore(format!("Failed to delete index: {}", e)))?;

        if deleted == 0 {
            return Err(AppError::VectorStore(format!("Index '{}' does not exist", name)));
        }

        tracing::info!("Deleted index '{}'", name);
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> AppResult<IndexStats> {
        let conn = self.conn()?;
        let (dimension, metric) = Self::index_shape(&conn, name)?;
        let vector_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM entries WHERE index_name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map_err(|e| AppError::VectorStore(format!("Failed to count entries: {}", e)))?;

        Ok(IndexStats {
            name: name.to_string(),
            dimension,
            metric,
            vector_count: vector_count as u64,
        })
    }
}

fn score(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Cosine => cosine_similarity(a, b),
        DistanceMetric::Dotproduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
    }
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::VectorStore(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

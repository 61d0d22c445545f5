//! Knowledge pipeline type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use pdfqa_core::AppError;

/// Sentinel returned when the index holds nothing close to the query.
pub const NO_MATCH_ANSWER: &str = "No relevant information found in the index for the given query.";

/// A window of the source text.
///
/// `start` is a character offset, not a byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position in the chunk sequence
    pub position: usize,

    /// Character offset of the first character in the source text
    pub start: usize,

    pub text: String,
}

impl Chunk {
    /// Identifier used when the chunk is written to an index.
    pub fn entry_id(&self) -> String {
        entry_id(self.position)
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Index identifier for the chunk at `position`: `id0`, `id1`, ...
pub fn entry_id(position: usize) -> String {
    format!("id{}", position)
}

/// Metadata stored alongside every vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub text: String,
}

/// One (id, vector, metadata) triple in a vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Pair a chunk with its embedding.
    pub fn from_chunk(chunk: &Chunk, values: Vec<f32>) -> Self {
        Self {
            id: chunk.entry_id(),
            values,
            metadata: EntryMetadata {
                text: chunk.text.clone(),
            },
        }
    }
}

/// A nearest-neighbor hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<EntryMetadata>,
}

impl QueryMatch {
    pub fn text(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.text.as_str())
    }
}

/// Similarity metric an index is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::Dotproduct => "dotproduct",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            "dotproduct" => Ok(Self::Dotproduct),
            other => Err(AppError::VectorStore(format!("Unknown metric: {}", other))),
        }
    }
}

/// Size and shape of an existing index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub name: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub vector_count: u64,
}

/// Counts reported after an ingest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub index_name: String,
    pub source: String,
    pub chars_extracted: usize,
    pub chunks_count: usize,
    pub entries_upserted: usize,
    pub dimension: usize,
    pub duration_secs: f64,
}

/// Result of the read path before completion.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// The index returned no matches
    NoMatch,

    /// The best match and the prompt built from it
    Context {
        id: String,
        score: f32,
        context: String,
        prompt: String,
    },
}

/// Final answer to a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: String,

    /// Whether the index produced a match; false means `answer` is the sentinel
    pub matched: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Answer {
    /// The answer returned when retrieval finds nothing; no completion is requested.
    pub fn no_information() -> Self {
        Self {
            answer: NO_MATCH_ANSWER.to_string(),
            matched: false,
            match_id: None,
            score: None,
            context: None,
        }
    }
}

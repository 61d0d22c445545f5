//! Document question answering over a vector index.
//!
//! Text is pulled from a [`TextSource`], split into overlapping character
//! windows, embedded, and stored in a [`VectorStore`]. Questions are embedded
//! the same way, matched against the index, and answered by a completion
//! model from the best-matching chunk.

pub mod chunker;
pub mod embeddings;
pub mod pipeline;
pub mod registry;
pub mod source;
pub mod types;
pub mod vector_store;

#[cfg(test)]
mod tests;

pub use chunker::{chunk_text, chunk_with};
pub use embeddings::{create_provider, EmbeddingProvider, MockProvider, OpenAiEmbeddingProvider};
pub use pipeline::{IndexLocks, Pipeline, PipelineOptions};
pub use registry::IndexRecord;
pub use source::{extract_pdf_text, PdfSource, TableSource, TextSource};
pub use types::{
    Answer, Chunk, DistanceMetric, EntryMetadata, IndexEntry, IndexStats, IngestStats,
    QueryMatch, RetrievalOutcome, NO_MATCH_ANSWER,
};
pub use vector_store::{create_store, PineconeStore, SqliteStore, VectorStore};

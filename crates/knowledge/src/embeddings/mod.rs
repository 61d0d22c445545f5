//! Embedding providers.
//!
//! Chunks are embedded in one batch call during ingest; each query is
//! embedded with a single call. Every vector in an index must come from the
//! same model so that cosine scores remain comparable.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{mock::MockProvider, openai::OpenAiEmbeddingProvider};

//! Error types for pdfqa.
//!
//! One enum covers every failure category of the pipeline: configuration,
//! source I/O, the three hosted services, and prompt rendering. An empty
//! retrieval is not an error and has no variant here.

use thiserror::Error;

/// Unified error type for pdfqa.
///
/// All fallible operations return `Result<T, AppError>` and propagate with `?`
/// up to the command or HTTP handler that started them.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing credentials, unknown providers, invalid chunk settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source file or database that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The source exists but text could not be read from it
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hosted embedding service errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index service errors
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Text completion service errors
    #[error("Completion error: {0}")]
    Completion(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the caller can reasonably retry with different input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

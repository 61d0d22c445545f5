//! Command handlers for the pdfqa CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod index;
pub mod ingest;
pub mod run;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use index::IndexCommand;
pub use ingest::IngestCommand;
pub use run::RunCommand;
pub use serve::ServeCommand;

use pdfqa_core::AppResult;
use pdfqa_knowledge::Answer;

/// Print a serializable value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_answer(answer: &Answer, json: bool) -> AppResult<()> {
    if json {
        return print_json(answer);
    }

    println!("{}", answer.answer);
    if let (Some(id), Some(score)) = (&answer.match_id, answer.score) {
        tracing::debug!("Answered from {} (score {:.3})", id, score);
    }
    Ok(())
}

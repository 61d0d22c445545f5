//! Ask command handler.
//!
//! Answers a question from the index populated by a previous ingest.

use clap::Args;
use pdfqa_core::{config::AppConfig, AppError, AppResult};
use pdfqa_knowledge::Pipeline;

/// Answer a question from the ingested document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command against '{}'", config.vector_store.index_name);

        if self.query.trim().is_empty() {
            return Err(AppError::Config("Query must not be empty".to_string()));
        }

        let pipeline = Pipeline::from_config(config)?;
        let answer = pipeline.answer(&self.query).await?;

        super::print_answer(&answer, self.json)
    }
}

//! Run command handler.
//!
//! One-shot ingest followed by a question, optionally deleting the index
//! afterwards.

use super::ingest::{ingest_and_record, SourceArgs};
use clap::Args;
use pdfqa_core::{config::AppConfig, AppError, AppResult};
use pdfqa_knowledge::{IndexRecord, Pipeline};

/// Ingest then ask in one go
#[derive(Args, Debug)]
pub struct RunCommand {
    /// The question to ask
    pub query: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Delete the index once the question is answered
    #[arg(long)]
    pub delete_index: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing run command");
        tracing::debug!("Run options: {:?}", self);

        if self.query.trim().is_empty() {
            return Err(AppError::Config("Query must not be empty".to_string()));
        }

        let source = self.source.resolve(config)?;
        let pipeline = Pipeline::from_config(config)?;

        let stats = ingest_and_record(&pipeline, source.as_ref(), config).await?;
        tracing::info!("Ingested {} chunks", stats.chunks_count);

        let answer = pipeline.answer(&self.query).await?;
        super::print_answer(&answer, self.json)?;

        if self.delete_index {
            pipeline.teardown().await?;
            IndexRecord::remove(&config.state_dir())?;
            tracing::info!("Deleted index '{}'", pipeline.index_name());
        }

        Ok(())
    }
}

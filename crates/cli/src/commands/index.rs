//! Index command handler.
//!
//! Talks to the vector store only, so no embedding or completion credentials
//! are needed.

use clap::{Args, Subcommand};
use pdfqa_core::{config::AppConfig, AppResult};
use pdfqa_knowledge::{create_store, IndexRecord, VectorStore};
use std::sync::Arc;
use std::time::Duration;

/// Inspect or delete the vector index
#[derive(Args, Debug)]
pub struct IndexCommand {
    #[command(subcommand)]
    pub action: IndexAction,
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Show dimension, metric and entry count
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the index and its entries
    Delete,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = open_store(config)?;
        let index = config.vector_store.index_name.as_str();

        match &self.action {
            IndexAction::Stats { json } => {
                tracing::info!("Executing index stats for '{}'", index);
                let stats = store.describe_index(index).await?;
                let record = IndexRecord::load(&config.state_dir())?
                    .filter(|r| r.index_name == stats.name);

                if *json {
                    super::print_json(&serde_json::json!({
                        "index": stats,
                        "lastIngest": record,
                    }))?;
                } else {
                    println!("Index: {}", stats.name);
                    println!("Dimension: {}", stats.dimension);
                    println!("Metric: {}", stats.metric);
                    println!("Entries: {}", stats.vector_count);
                    if let Some(record) = record {
                        println!(
                            "Last ingest: {} ({} chunks) at {}",
                            record.source,
                            record.chunk_count,
                            record.ingested_at.to_rfc3339()
                        );
                    }
                }
            }

            IndexAction::Delete => {
                tracing::info!("Executing index delete for '{}'", index);
                store.delete_index(index).await?;

                let recorded = IndexRecord::load(&config.state_dir())?
                    .is_some_and(|r| r.index_name == index);
                if recorded {
                    IndexRecord::remove(&config.state_dir())?;
                }

                println!("Index '{}' deleted", index);
            }
        }

        Ok(())
    }
}

fn open_store(config: &AppConfig) -> AppResult<Arc<dyn VectorStore>> {
    create_store(
        &config.vector_store,
        config.pinecone_api_key.as_deref(),
        &config.vector_db_path(),
        config.request_timeout_secs.map(Duration::from_secs),
    )
}

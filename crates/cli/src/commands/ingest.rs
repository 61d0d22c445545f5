//! Ingest command handler.
//!
//! Reads a PDF (or a database column), chunks and embeds it, and stores the
//! vectors in the configured index.

use clap::Args;
use pdfqa_core::{config::AppConfig, AppError, AppResult};
use pdfqa_knowledge::{IngestStats, PdfSource, Pipeline, TableSource, TextSource};
use std::path::PathBuf;

/// Where the text to ingest comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// PDF file to ingest (default: PDF_PATH)
    pub pdf: Option<PathBuf>,

    /// Read the text from a SQLite database instead of a PDF
    #[arg(long, conflicts_with = "pdf")]
    pub from_db: Option<PathBuf>,

    /// Table to read with --from-db
    #[arg(long, requires = "from_db")]
    pub table: Option<String>,

    /// Column to read with --from-db
    #[arg(long, requires = "from_db")]
    pub column: Option<String>,
}

impl SourceArgs {
    /// Resolve the flags against configuration into a concrete source.
    pub fn resolve(&self, config: &AppConfig) -> AppResult<Box<dyn TextSource>> {
        if let Some(db) = &self.from_db {
            let table = self.table.as_deref().unwrap_or(&config.database.table);
            let column = self.column.as_deref().unwrap_or(&config.database.column);
            return Ok(Box::new(TableSource::new(db, table, column)?));
        }

        let path = self
            .pdf
            .clone()
            .or_else(|| config.pdf_path.clone())
            .ok_or_else(|| {
                AppError::Config("No PDF given: pass a path or set PDF_PATH".to_string())
            })?;
        Ok(Box::new(PdfSource::new(path)))
    }
}

/// Extract, chunk, embed and store a document
#[derive(Args, Debug)]
pub struct IngestCommand {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest options: {:?}", self);

        let source = self.source.resolve(config)?;
        let pipeline = Pipeline::from_config(config)?;
        let stats = ingest_and_record(&pipeline, source.as_ref(), config).await?;

        if self.json {
            super::print_json(&stats)?;
        } else {
            println!(
                "Ingested {} chunks ({} chars) into '{}' in {:.2}s",
                stats.chunks_count, stats.chars_extracted, stats.index_name, stats.duration_secs
            );
        }

        Ok(())
    }
}

/// Ingest and persist the index record so later runs find the index.
pub(crate) async fn ingest_and_record(
    pipeline: &Pipeline,
    source: &dyn TextSource,
    config: &AppConfig,
) -> AppResult<IngestStats> {
    let stats = pipeline.ingest(source).await?;
    pipeline.index_record(&stats).save(&config.state_dir())?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn config(pdf_path: Option<&str>) -> AppConfig {
        let temp = TempDir::new().unwrap();
        let mut vars = HashMap::new();
        if let Some(path) = pdf_path {
            vars.insert("PDF_PATH".to_string(), path.to_string());
        }
        AppConfig::load_with(temp.path().to_path_buf(), None, |key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_explicit_pdf_wins_over_env() {
        let args = SourceArgs {
            pdf: Some(PathBuf::from("given.pdf")),
            ..Default::default()
        };
        let source = args.resolve(&config(Some("env.pdf"))).unwrap();
        assert_eq!(source.describe(), "given.pdf");
    }

    #[test]
    fn test_pdf_path_from_env() {
        let source = SourceArgs::default().resolve(&config(Some("env.pdf"))).unwrap();
        assert_eq!(source.describe(), "env.pdf");
    }

    #[test]
    fn test_missing_pdf_is_config_error() {
        let result = SourceArgs::default().resolve(&config(None));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_database_source_uses_configured_table() {
        let args = SourceArgs {
            from_db: Some(PathBuf::from("docs.db")),
            column: Some("body".to_string()),
            ..Default::default()
        };
        let source = args.resolve(&config(None)).unwrap();
        assert_eq!(source.describe(), "docs.db:pdf_data.body");
    }
}

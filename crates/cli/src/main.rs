//! pdfqa CLI
//!
//! Main entry point for the pdfqa command-line tool.
//! Ingests a PDF into a vector index and answers questions from it.

mod commands;
mod server;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IndexCommand, IngestCommand, RunCommand, ServeCommand};
use pdfqa_core::{config::AppConfig, logging, AppResult};
use pdfqa_knowledge::IndexRecord;
use std::path::PathBuf;

/// pdfqa - ask questions about a PDF with retrieval-augmented generation
#[derive(Parser, Debug)]
#[command(name = "pdfqa")]
#[command(about = "Ask questions about a PDF with retrieval-augmented generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PDFQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PDFQA_CONFIG")]
    config: Option<PathBuf>,

    /// Vector index name (default: the last ingested index, then "regqa")
    #[arg(short, long, global = true)]
    index: Option<String>,

    /// Log level (error, warn, info, debug, trace; default: RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract, chunk, embed and store a document
    Ingest(IngestCommand),

    /// Answer a question from the ingested document
    Ask(AskCommand),

    /// Ingest then ask in one go
    Run(RunCommand),

    /// Serve the HTTP API
    Serve(ServeCommand),

    /// Inspect or delete the vector index
    Index(IndexCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ingest(_) => "ingest",
            Commands::Ask(_) => "ask",
            Commands::Run(_) => "run",
            Commands::Serve(_) => "serve",
            Commands::Index(_) => "index",
        }
    }

    /// Commands that read an index someone else populated.
    fn reads_existing_index(&self) -> bool {
        matches!(self, Commands::Ask(_) | Commands::Serve(_) | Commands::Index(_))
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let explicit_index = cli.index.is_some();
    let mut config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.index,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("pdfqa starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    for path in &config.env_files {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    config.ensure_state_dir()?;

    if !explicit_index && cli.command.reads_existing_index() {
        if let Some(record) = IndexRecord::load(&config.state_dir())? {
            if record.backend != config.vector_store.backend {
                tracing::warn!(
                    "Index '{}' was ingested with the {} backend, but {} is configured",
                    record.index_name,
                    record.backend,
                    config.vector_store.backend
                );
            }
            tracing::debug!("Using recorded index '{}'", record.index_name);
            config.vector_store.index_name = record.index_name;
        }
    }

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Run(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

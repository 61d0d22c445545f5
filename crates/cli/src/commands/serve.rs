//! Serve command handler.

use crate::server;
use clap::Args;
use pdfqa_core::{config::AppConfig, AppResult};
use pdfqa_knowledge::Pipeline;
use std::sync::Arc;

/// Serve the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (default: from config, 127.0.0.1:5000)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let bind = self.bind.as_deref().unwrap_or(&config.bind);
        tracing::info!("Executing serve command on {}", bind);

        let pipeline = Arc::new(Pipeline::from_config(config)?);
        server::start_server(bind, pipeline, config.state_dir()).await
    }
}

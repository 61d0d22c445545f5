//! HTTP API over the pipeline.
//!
//! `POST /api/process` ingests a PDF, `GET /retrieve?query=` answers a question.

mod handlers;
mod routing;

pub use routing::create_router;

use pdfqa_core::{AppError, AppResult};
use pdfqa_knowledge::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared by every request handler.
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Where the index record is written after each ingest
    pub state_dir: PathBuf,
}

/// Bind and serve until the process is stopped.
pub async fn start_server(bind: &str, pipeline: Arc<Pipeline>, state_dir: PathBuf) -> AppResult<()> {
    let state = Arc::new(AppState {
        pipeline,
        state_dir,
    });
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", bind, e)))?;
    tracing::info!("Server listening on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Other(format!("Server error: {}", e)))
}

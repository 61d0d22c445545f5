//! Axum router configuration.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/process", post(handlers::process))
        .route("/retrieve", get(handlers::retrieve))
        .with_state(state)
}

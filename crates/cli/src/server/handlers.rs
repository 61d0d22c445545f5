//! Request handlers.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfqa_knowledge::PdfSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub pdf_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Error payload `{"error": "..."}` with a status code.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

/// POST /api/process - ingest the PDF at `pdf_path`
pub async fn process(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let pdf_path = request
        .pdf_path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing pdf_path"))?;

    tracing::info!("Processing {}", pdf_path);

    let source = PdfSource::new(&pdf_path);
    let stats = state.pipeline.ingest(&source).await.map_err(|e| {
        tracing::error!("Processing {} failed: {}", pdf_path, e);
        ApiError::internal(e.to_string())
    })?;

    state
        .pipeline
        .index_record(&stats)
        .save(&state.state_dir)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(MessageResponse {
        message: format!(
            "PDF processed and {} chunks upserted to index '{}'",
            stats.chunks_count, stats.index_name
        ),
    }))
}

/// GET /retrieve?query= - answer a question from the index
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RetrieveParams>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing query parameter"))?;

    let answer = state.pipeline.answer(&query).await.map_err(|e| {
        tracing::error!("Retrieval failed: {}", e);
        ApiError::internal(e.to_string())
    })?;

    Ok(Json(AnswerResponse {
        answer: answer.answer,
    }))
}

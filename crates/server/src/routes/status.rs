use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::types::Envelope;
use service::observability::encode_metrics;

use crate::errors::ApiError;

/// GET /api/status
pub async fn status() -> Json<Envelope> {
    Json(Envelope::message("server is running"))
}

/// GET /metrics
pub async fn metrics() -> Response {
    match encode_metrics() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => ApiError::internal(e).into_response(),
    }
}

pub async fn api_not_found() -> ApiError {
    ApiError::not_found("API route not found")
}

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    Json,
};
use common::types::Envelope;
use serde_json::Value;
use service::errors::ServiceError;

use crate::errors::ApiError;
use crate::routes::AppState;

/// GET /api/data/:data_type
pub async fn get_one(
    State(state): State<AppState>,
    data_type: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope>, ApiError> {
    let Path(data_type) = data_type?;
    let data = state.store.get(&data_type).await?;
    Ok(Json(Envelope::data(data)))
}

/// POST /api/data/:data_type (and the legacy /save/:data_type)
pub async fn put_one(
    State(state): State<AppState>,
    data_type: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Envelope>, ApiError> {
    let Path(data_type) = data_type?;
    // oversized bodies end up here as 413
    let body = body?;
    let value = parse_body(&body)?;
    state.store.put(&data_type, &value).await?;
    Ok(Json(Envelope::message(format!("{data_type} saved"))))
}

/// GET /api/all-data
pub async fn get_all(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    let all = state.store.get_all().await?;
    Ok(Json(Envelope::data(Value::Object(all))))
}

/// The body must be a JSON document; `null` counts as no data.
fn parse_body(body: &[u8]) -> Result<Value, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServiceError::MalformedRequest("request body is empty".into()));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => Err(ServiceError::MalformedRequest("request body is null".into())),
        Ok(value) => Ok(value),
        Err(e) => Err(ServiceError::MalformedRequest(format!("invalid JSON: {e}"))),
    }
}

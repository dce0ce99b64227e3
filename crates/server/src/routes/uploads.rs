use axum::{
    body::Bytes,
    extract::{multipart::{MultipartError, MultipartRejection}, Multipart, State},
    Json,
};
use common::types::UploadResponse;
use tracing::debug;

use crate::errors::ApiError;
use crate::routes::AppState;

/// POST /api/upload-screenshots
///
/// Multipart fields: any number of `files`, optional `submissionId`. The id may
/// arrive after the files, so parts are buffered before anything is written.
pub async fn upload_screenshots(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut requested_id: Option<String> = None;
    let mut pending: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("invalid multipart body", e))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("submissionId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("invalid submissionId", e))?;
                requested_id = Some(text);
            }
            Some("files") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("invalid file part", e))?;
                // browsers send an empty part when no file was picked
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                pending.push((file_name, bytes));
            }
            other => debug!(field = ?other, "ignoring multipart field"),
        }
    }

    let submission_id = state.uploads.resolve_submission_id(requested_id.as_deref());
    let mut files = Vec::with_capacity(pending.len());
    for (file_name, bytes) in pending {
        files.push(state.uploads.save(&submission_id, &file_name, &bytes).await?);
    }

    Ok(Json(UploadResponse { success: true, files }))
}

/// Keeps the status axum picked (400, or 413 once the upload cap is hit).
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    ApiError::new(e.status(), format!("{context}: {}", e.body_text()))
}

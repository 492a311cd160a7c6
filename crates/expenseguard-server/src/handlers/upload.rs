//! Fraud scoring upload handler

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{AppError, AppState};
use expenseguard_core::{parse_csv, FraudReport};

/// POST /upload_csv - Score and categorize an uploaded CSV
///
/// Expects a multipart form with a `file` part carrying the CSV. Parts
/// without a filename are ignored.
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<FraudReport>, AppError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, state.limits.max_upload_bytes))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, state.limits.max_upload_bytes))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| AppError::bad_request("No file part"))?;
    if filename.is_empty() {
        return Err(AppError::bad_request("No selected file"));
    }

    info!(filename = %filename, bytes = data.len(), "Received CSV upload");

    let report = tokio::task::spawn_blocking(move || {
        let batch = parse_csv(data.as_ref())?;
        state.pipeline.score_batch(batch)
    })
    .await??;

    Ok(Json(report))
}

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::bad_request(&format!(
            "File too large. Maximum size is {} MB",
            limit / 1024 / 1024
        ))
    } else {
        AppError::bad_request(&format!("Failed to read form field: {}", err.body_text()))
    }
}

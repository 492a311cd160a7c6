//! Forecast handler

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use crate::{AppError, AppState};
use expenseguard_core::{parse_json_records, ForecastReport};

/// POST /forecast - Forecast daily spending from a JSON array of records
///
/// Records need `Time` (epoch seconds) and `Amount`; the scored
/// `all_transactions` from /upload_csv can be posted back unchanged.
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ForecastReport>, AppError> {
    let body = body.map_err(|e| body_error(e, state.limits.max_upload_bytes))?;
    let timeout = state.limits.forecast_timeout;

    let task = tokio::task::spawn_blocking(move || {
        let batch = parse_json_records(&body)?;
        state.pipeline.forecast_batch(&batch)
    });

    // On expiry the blocking task runs to completion and its result is dropped
    let report = tokio::time::timeout(timeout, task).await.map_err(|_| {
        warn!(timeout_secs = timeout.as_secs(), "Forecast timed out");
        AppError::internal("Forecast timed out")
    })???;

    Ok(Json(report))
}

fn body_error(err: BytesRejection, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::bad_request(&format!(
            "Request body too large. Maximum size is {} MB",
            limit / 1024 / 1024
        ))
    } else {
        AppError::bad_request(&format!("Failed to read request body: {}", err.body_text()))
    }
}

//! Metrics write endpoint
//!
//! Accepts one decompressed batch per request and returns only after the
//! whole batch has been scored.

use crate::coordinator::BatchSummary;
use crate::{ApiResult, AppState};
use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use tracing::warn;

/// POST /api/v1/metrics/write
///
/// **Errors:**
/// - 400 Bad Request: batch could not be decoded; nothing was scored
///
/// Store failures inside the batch are logged and do not fail the request.
pub async fn write_metrics(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<BatchSummary>> {
    let summary = state.coordinator.ingest_bytes(&body).await.map_err(|e| {
        warn!("Rejected metrics batch ({} bytes): {}", body.len(), e);
        e
    })?;

    Ok(Json(summary))
}

/// Build metrics ingestion routes
pub fn metrics_routes() -> Router<AppState> {
    Router::new().route("/api/v1/metrics/write", post(write_metrics))
}

//! Inbound metrics webhook: validates, normalizes, and idempotently persists
//! batches of externally supplied performance metrics, then records one audit
//! row per persistence attempt.
//!
//! The handler authenticates with the `x-api-key` header (looked up in the
//! credential registry, not the session token map) and takes the body as raw
//! bytes so malformed JSON can be reported before any record-level work.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Serialize;

use pulseboard_core::ingest::{joined_platforms, normalize_payload, validate_batch};
use pulseboard_db::{record_sync_failure, record_sync_success, resolve_account_by_api_key};

use super::insights::InsightItem;
use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct IngestResponse {
    pub success: bool,
    pub records_synced: usize,
    pub data: Vec<InsightItem>,
}

/// POST /api/v1/webhooks/make — ingest a batch of metric records.
pub(super) async fn ingest_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    // Pre-authentication failures have no account to attribute an audit row to.
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing x-api-key header"))?;

    let user_id = resolve_account_by_api_key(&state.pool, api_key)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::unauthorized("Invalid API key"))?;

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("Invalid JSON body"))?;

    let batch = normalize_payload(payload);
    if batch.is_empty() {
        return Err(ApiError::bad_request("Empty payload"));
    }

    // The whole batch is validated before any row is written, so a caller
    // retrying after a validation fix never sees a partially applied sync.
    let records = validate_batch(&batch).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let platforms = joined_platforms(&records);

    match pulseboard_db::upsert_insights(&state.pool, user_id, &records).await {
        Ok(rows) => {
            let records_synced = rows.len();
            let synced = i32::try_from(records_synced).unwrap_or(i32::MAX);
            if let Err(e) = record_sync_success(&state.pool, user_id, &platforms, synced).await {
                tracing::error!(error = %e, "failed to write success audit row");
            }
            tracing::info!(
                records = records_synced,
                platforms = %platforms,
                "metrics batch ingested"
            );
            Ok(Json(IngestResponse {
                success: true,
                records_synced,
                data: rows.into_iter().map(InsightItem::from).collect(),
            }))
        }
        Err(e) => {
            let message = e.to_string();
            tracing::error!(error = %message, "metrics batch upsert failed");
            if let Err(log_err) =
                record_sync_failure(&state.pool, user_id, &platforms, &message).await
            {
                tracing::error!(error = %log_err, "failed to write error audit row");
            }
            Err(ApiError::internal(message))
        }
    }
}

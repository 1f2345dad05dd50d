//! Credential endpoints: report and regenerate the Make.com API key.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;
use uuid::Uuid;

use pulseboard_db::{SyncLogRow, MAKE_API_KEY_SETTING};

use crate::middleware::AccountId;

use super::{map_db_error, ApiError, AppState};

const SYNC_LOG_LIMIT: i64 = 20;
const API_KEY_BYTES: usize = 24;

#[derive(Debug, Serialize)]
pub(super) struct SyncLogItem {
    pub id: i64,
    pub user_id: Uuid,
    pub platform: String,
    pub records_synced: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SyncLogRow> for SyncLogItem {
    fn from(row: SyncLogRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            platform: row.platform,
            records_synced: row.records_synced,
            status: row.status,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MakeSettingsResponse {
    pub has_api_key: bool,
    pub api_key: Option<String>,
    pub sync_logs: Vec<SyncLogItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeneratedKeyResponse {
    pub api_key: String,
}

/// GET /api/v1/settings/make — current key (if any) plus recent sync audit rows.
pub(super) async fn get_make_settings(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
) -> Result<Json<MakeSettingsResponse>, ApiError> {
    let key_setting = pulseboard_db::get_setting(&state.pool, account.0, MAKE_API_KEY_SETTING)
        .await
        .map_err(|e| map_db_error(&e))?;

    let sync_logs = pulseboard_db::list_recent_sync_logs(&state.pool, account.0, SYNC_LOG_LIMIT)
        .await
        .map_err(|e| map_db_error(&e))?;

    let api_key = key_setting.map(|row| row.value);

    Ok(Json(MakeSettingsResponse {
        has_api_key: api_key.is_some(),
        api_key,
        sync_logs: sync_logs.into_iter().map(SyncLogItem::from).collect(),
    }))
}

/// POST /api/v1/settings/make — generate a fresh key, replacing any prior one.
///
/// The old key stops resolving the moment the upsert commits; there is no
/// grace period and no multi-key support.
pub(super) async fn generate_make_key(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
) -> Result<Json<GeneratedKeyResponse>, ApiError> {
    let api_key = generate_api_key();

    pulseboard_db::upsert_setting(&state.pool, account.0, MAKE_API_KEY_SETTING, &api_key)
        .await
        .map_err(|e| map_db_error(&e))?;

    tracing::info!("regenerated Make.com API key");

    Ok(Json(GeneratedKeyResponse { api_key }))
}

/// Generates an unguessable `mk_`-prefixed token from a cryptographically
/// secure RNG.
fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("mk_{hex}")
}

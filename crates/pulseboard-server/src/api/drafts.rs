use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pulseboard_db::DraftRow;

use crate::middleware::AccountId;

use super::{
    map_db_error, require_id, validate_content_type, validate_draft_status, validate_platform,
    ApiError, AppState, IdQuery,
};

#[derive(Debug, Serialize)]
pub(super) struct DraftItem {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub platform: String,
    pub content_type: String,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DraftRow> for DraftItem {
    fn from(row: DraftRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            caption: row.caption,
            hashtags: row.hashtags,
            platform: row.platform,
            content_type: row.content_type,
            status: row.status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DraftsQuery {
    pub status: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateDraftRequest {
    pub title: String,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub platform: String,
    pub content_type: String,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateDraftRequest {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub platform: Option<String>,
    pub content_type: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// GET /api/v1/drafts — list drafts, most recently updated first.
pub(super) async fn list_drafts(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Query(query): Query<DraftsQuery>,
) -> Result<Json<Vec<DraftItem>>, ApiError> {
    let rows = pulseboard_db::list_drafts(
        &state.pool,
        account.0,
        query.status.as_deref(),
        query.platform.as_deref(),
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    Ok(Json(rows.into_iter().map(DraftItem::from).collect()))
}

/// POST /api/v1/drafts — create a new draft.
pub(super) async fn create_draft(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Json(body): Json<CreateDraftRequest>,
) -> Result<Json<DraftItem>, ApiError> {
    validate_platform(&body.platform)?;
    validate_content_type(&body.content_type)?;
    let status = body.status.as_deref().unwrap_or("draft");
    validate_draft_status(status)?;

    let row = pulseboard_db::create_draft(
        &state.pool,
        account.0,
        &body.title,
        body.caption.as_deref().unwrap_or(""),
        &body.hashtags.unwrap_or_default(),
        &body.platform,
        &body.content_type,
        status,
        body.notes.as_deref().unwrap_or(""),
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    Ok(Json(row.into()))
}

/// PATCH /api/v1/drafts — sparse update by id; refreshes `updated_at`.
pub(super) async fn update_draft(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Json(body): Json<UpdateDraftRequest>,
) -> Result<Json<DraftItem>, ApiError> {
    let id = require_id(body.id)?;
    if let Some(ref platform) = body.platform {
        validate_platform(platform)?;
    }
    if let Some(ref content_type) = body.content_type {
        validate_content_type(content_type)?;
    }
    if let Some(ref status) = body.status {
        validate_draft_status(status)?;
    }

    let row = pulseboard_db::update_draft(
        &state.pool,
        account.0,
        id,
        body.title.as_deref(),
        body.caption.as_deref(),
        body.hashtags.as_deref(),
        body.platform.as_deref(),
        body.content_type.as_deref(),
        body.status.as_deref(),
        body.notes.as_deref(),
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    Ok(Json(row.into()))
}

/// DELETE /api/v1/drafts?id= — delete a draft.
pub(super) async fn delete_draft(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Query(query): Query<IdQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = require_id(query.id)?;

    pulseboard_db::delete_draft(&state.pool, account.0, id)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(serde_json::json!({ "success": true })))
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pulseboard_db::CalendarEventRow;

use crate::middleware::AccountId;

use super::{
    map_db_error, require_id, validate_content_type, validate_platform, ApiError, AppState,
    IdQuery,
};

#[derive(Debug, Serialize)]
pub(super) struct CalendarEventItem {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub platform: Option<String>,
    pub content_type: Option<String>,
    pub draft_id: Option<i64>,
    pub color: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl From<CalendarEventRow> for CalendarEventItem {
    fn from(row: CalendarEventRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            date: row.date,
            platform: row.platform,
            content_type: row.content_type,
            draft_id: row.draft_id,
            color: row.color,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CalendarQuery {
    /// Month number as sent by the calendar page, e.g. "05".
    pub month: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateEventRequest {
    pub title: String,
    pub date: NaiveDate,
    pub platform: Option<String>,
    pub content_type: Option<String>,
    pub draft_id: Option<i64>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

// Option<Option<T>> is intentional: outer None = "not in request" (keep current),
// Some(None) = "explicitly cleared", Some(Some(v)) = "set to value" (PATCH semantics).
#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateEventRequest {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub platform: Option<Option<String>>,
    pub content_type: Option<Option<String>>,
    pub draft_id: Option<Option<i64>>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

/// GET /api/v1/calendar — list events ascending by date; `?month=MM&year=YYYY`
/// constrains to that calendar month.
pub(super) async fn list_events(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarEventItem>>, ApiError> {
    let range = match (query.month.as_deref(), query.year.as_deref()) {
        (Some(month), Some(year)) => Some(
            month_range(year, month).ok_or_else(|| ApiError::bad_request("Invalid month or year"))?,
        ),
        _ => None,
    };

    let rows = pulseboard_db::list_calendar_events(&state.pool, account.0, range)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(rows.into_iter().map(CalendarEventItem::from).collect()))
}

/// POST /api/v1/calendar — create a new event.
pub(super) async fn create_event(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Json(body): Json<CreateEventRequest>,
) -> Result<Json<CalendarEventItem>, ApiError> {
    if let Some(ref platform) = body.platform {
        validate_platform(platform)?;
    }
    if let Some(ref content_type) = body.content_type {
        validate_content_type(content_type)?;
    }

    let row = pulseboard_db::create_calendar_event(
        &state.pool,
        account.0,
        &body.title,
        body.date,
        body.platform.as_deref(),
        body.content_type.as_deref(),
        body.draft_id,
        body.color.as_deref().unwrap_or(""),
        body.notes.as_deref().unwrap_or(""),
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    Ok(Json(row.into()))
}

/// PATCH /api/v1/calendar — sparse update by id.
pub(super) async fn update_event(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<CalendarEventItem>, ApiError> {
    let id = require_id(body.id)?;
    if let Some(Some(ref platform)) = body.platform {
        validate_platform(platform)?;
    }
    if let Some(Some(ref content_type)) = body.content_type {
        validate_content_type(content_type)?;
    }

    let row = pulseboard_db::update_calendar_event(
        &state.pool,
        account.0,
        id,
        body.title.as_deref(),
        body.date,
        body.platform.as_ref().map(|opt| opt.as_deref()),
        body.content_type.as_ref().map(|opt| opt.as_deref()),
        body.draft_id,
        body.color.as_deref(),
        body.notes.as_deref(),
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    Ok(Json(row.into()))
}

/// DELETE /api/v1/calendar?id= — delete an event.
pub(super) async fn delete_event(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Query(query): Query<IdQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = require_id(query.id)?;

    pulseboard_db::delete_calendar_event(&state.pool, account.0, id)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Resolves a `(year, month)` query pair to the first and last day of that
/// calendar month.
fn month_range(year: &str, month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

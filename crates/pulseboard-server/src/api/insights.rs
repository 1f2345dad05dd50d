use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pulseboard_core::ingest::validate_record;
use pulseboard_db::InsightRow;

use crate::middleware::AccountId;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct InsightItem {
    pub id: i64,
    pub user_id: Uuid,
    pub platform: String,
    pub date: NaiveDate,
    pub followers: i64,
    pub reach: i64,
    pub impressions: i64,
    pub engagement_rate: f64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub saves: i64,
    pub profile_visits: i64,
    pub created_at: DateTime<Utc>,
}

impl From<InsightRow> for InsightItem {
    fn from(row: InsightRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            platform: row.platform,
            date: row.date,
            followers: row.followers,
            reach: row.reach,
            impressions: row.impressions,
            engagement_rate: row.engagement_rate,
            likes: row.likes,
            comments: row.comments,
            shares: row.shares,
            saves: row.saves,
            profile_visits: row.profile_visits,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct InsightsQuery {
    pub platform: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// GET /api/v1/insights — list insights ascending by date with optional
/// platform and date-range filters.
pub(super) async fn list_insights(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<Vec<InsightItem>>, ApiError> {
    let rows = pulseboard_db::list_insights(
        &state.pool,
        account.0,
        query.platform.as_deref(),
        query.start,
        query.end,
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    Ok(Json(rows.into_iter().map(InsightItem::from).collect()))
}

/// POST /api/v1/insights — manually upsert one metric record, keyed on the
/// same (platform, date) composite as webhook ingestion.
pub(super) async fn upsert_insight(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<InsightItem>, ApiError> {
    let record = validate_record(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let rows = pulseboard_db::upsert_insights(&state.pool, account.0, std::slice::from_ref(&record))
        .await
        .map_err(|e| map_db_error(&e))?;

    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::internal("upsert returned no row"))?;

    Ok(Json(row.into()))
}

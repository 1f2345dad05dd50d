//! Database operations for the `insights` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pulseboard_core::ingest::MetricRecord;

use crate::DbError;

const INSIGHT_COLUMNS: &str = "id, user_id, platform, date, followers, reach, impressions, \
     engagement_rate, likes, comments, shares, saves, profile_visits, created_at";

/// A row from the `insights` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InsightRow {
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

/// Upserts a whole batch of metric records for one account in a single
/// statement, keyed on `(user_id, platform, date)`.
///
/// Because the batch is one `INSERT ... ON CONFLICT` statement, a storage
/// failure leaves the table either fully updated for the batch or fully
/// unchanged. A batch that repeats a key within itself is rejected by the
/// store (one statement cannot update the same row twice) and surfaces as
/// [`DbError::Sqlx`].
///
/// Returns the persisted rows in batch order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_insights(
    pool: &PgPool,
    user_id: Uuid,
    records: &[MetricRecord],
) -> Result<Vec<InsightRow>, DbError> {
    let n = records.len();
    let user_ids = vec![user_id; n];
    let mut platforms = Vec::with_capacity(n);
    let mut dates = Vec::with_capacity(n);
    let mut followers = Vec::with_capacity(n);
    let mut reach = Vec::with_capacity(n);
    let mut impressions = Vec::with_capacity(n);
    let mut engagement_rates = Vec::with_capacity(n);
    let mut likes = Vec::with_capacity(n);
    let mut comments = Vec::with_capacity(n);
    let mut shares = Vec::with_capacity(n);
    let mut saves = Vec::with_capacity(n);
    let mut profile_visits = Vec::with_capacity(n);

    for record in records {
        platforms.push(record.key.platform.as_str().to_owned());
        dates.push(record.key.date);
        followers.push(record.followers);
        reach.push(record.reach);
        impressions.push(record.impressions);
        engagement_rates.push(record.engagement_rate);
        likes.push(record.likes);
        comments.push(record.comments);
        shares.push(record.shares);
        saves.push(record.saves);
        profile_visits.push(record.profile_visits);
    }

    let rows = sqlx::query_as::<_, InsightRow>(
        "INSERT INTO insights \
             (user_id, platform, date, followers, reach, impressions, engagement_rate, \
              likes, comments, shares, saves, profile_visits) \
         SELECT * FROM UNNEST( \
             $1::uuid[], $2::text[], $3::date[], $4::bigint[], $5::bigint[], $6::bigint[], \
             $7::double precision[], $8::bigint[], $9::bigint[], $10::bigint[], $11::bigint[], \
             $12::bigint[]) \
         ON CONFLICT (user_id, platform, date) DO UPDATE SET \
             followers       = EXCLUDED.followers, \
             reach           = EXCLUDED.reach, \
             impressions     = EXCLUDED.impressions, \
             engagement_rate = EXCLUDED.engagement_rate, \
             likes           = EXCLUDED.likes, \
             comments        = EXCLUDED.comments, \
             shares          = EXCLUDED.shares, \
             saves           = EXCLUDED.saves, \
             profile_visits  = EXCLUDED.profile_visits \
         RETURNING id, user_id, platform, date, followers, reach, impressions, \
                   engagement_rate, likes, comments, shares, saves, profile_visits, created_at",
    )
    .bind(user_ids)
    .bind(platforms)
    .bind(dates)
    .bind(followers)
    .bind(reach)
    .bind(impressions)
    .bind(engagement_rates)
    .bind(likes)
    .bind(comments)
    .bind(shares)
    .bind(saves)
    .bind(profile_visits)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns an account's insights ascending by date, optionally filtered by
/// platform and an inclusive date range.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_insights(
    pool: &PgPool,
    user_id: Uuid,
    platform: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<InsightRow>, DbError> {
    let rows = sqlx::query_as::<_, InsightRow>(&format!(
        "SELECT {INSIGHT_COLUMNS} \
         FROM insights \
         WHERE user_id = $1 \
           AND ($2::text IS NULL OR platform = $2) \
           AND ($3::date IS NULL OR date >= $3) \
           AND ($4::date IS NULL OR date <= $4) \
         ORDER BY date ASC, id ASC"
    ))
    .bind(user_id)
    .bind(platform)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the most recent `limit` insight rows for an account, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_insights(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<InsightRow>, DbError> {
    let rows = sqlx::query_as::<_, InsightRow>(&format!(
        "SELECT {INSIGHT_COLUMNS} \
         FROM insights \
         WHERE user_id = $1 \
         ORDER BY date DESC, id DESC \
         LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

//! Database operations for the `make_sync_log` audit table.
//!
//! Rows are insert-only: one per ingestion attempt, never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `make_sync_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncLogRow {
    pub id: i64,
    pub user_id: Uuid,
    pub platform: String,
    pub records_synced: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Records a successful sync: `status = 'success'`, no error message.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn record_sync_success(
    pool: &PgPool,
    user_id: Uuid,
    platforms: &str,
    records_synced: i32,
) -> Result<SyncLogRow, DbError> {
    let row = sqlx::query_as::<_, SyncLogRow>(
        "INSERT INTO make_sync_log (user_id, platform, records_synced, status) \
         VALUES ($1, $2, $3, 'success') \
         RETURNING id, user_id, platform, records_synced, status, error_message, created_at",
    )
    .bind(user_id)
    .bind(platforms)
    .bind(records_synced)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Records a failed sync: `status = 'error'`, `records_synced = 0`, and the
/// storage failure description.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn record_sync_failure(
    pool: &PgPool,
    user_id: Uuid,
    platforms: &str,
    error_message: &str,
) -> Result<SyncLogRow, DbError> {
    let row = sqlx::query_as::<_, SyncLogRow>(
        "INSERT INTO make_sync_log (user_id, platform, records_synced, status, error_message) \
         VALUES ($1, $2, 0, 'error', $3) \
         RETURNING id, user_id, platform, records_synced, status, error_message, created_at",
    )
    .bind(user_id)
    .bind(platforms)
    .bind(error_message)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the most recent `limit` audit rows for an account, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_sync_logs(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<SyncLogRow>, DbError> {
    let rows = sqlx::query_as::<_, SyncLogRow>(
        "SELECT id, user_id, platform, records_synced, status, error_message, created_at \
         FROM make_sync_log \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

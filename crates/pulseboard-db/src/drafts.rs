//! Database operations for the `drafts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const DRAFT_COLUMNS: &str = "id, user_id, title, caption, hashtags, platform, content_type, \
     status, notes, created_at, updated_at";

/// A row from the `drafts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DraftRow {
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

/// Returns an account's drafts, most recently updated first, optionally
/// filtered by status and platform.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_drafts(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<&str>,
    platform: Option<&str>,
) -> Result<Vec<DraftRow>, DbError> {
    let rows = sqlx::query_as::<_, DraftRow>(&format!(
        "SELECT {DRAFT_COLUMNS} \
         FROM drafts \
         WHERE user_id = $1 \
           AND ($2::text IS NULL OR status = $2) \
           AND ($3::text IS NULL OR platform = $3) \
         ORDER BY updated_at DESC, id DESC"
    ))
    .bind(user_id)
    .bind(status)
    .bind(platform)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Creates a new draft row and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
#[allow(clippy::too_many_arguments)] // public API for full draft creation; no sensible grouping
pub async fn create_draft(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    caption: &str,
    hashtags: &[String],
    platform: &str,
    content_type: &str,
    status: &str,
    notes: &str,
) -> Result<DraftRow, DbError> {
    let row = sqlx::query_as::<_, DraftRow>(&format!(
        "INSERT INTO drafts \
           (user_id, title, caption, hashtags, platform, content_type, status, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {DRAFT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(title)
    .bind(caption)
    .bind(hashtags.to_vec())
    .bind(platform)
    .bind(content_type)
    .bind(status)
    .bind(notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Updates provided fields on a draft and refreshes `updated_at`.
///
/// All `Option` fields are overlaid onto the existing row: `Some(v)` sets the
/// value, `None` preserves the existing value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the account has no draft with that id, or
/// [`DbError::Sqlx`] if the update fails.
#[allow(clippy::too_many_arguments)] // public API for partial draft update; no sensible grouping
pub async fn update_draft(
    pool: &PgPool,
    user_id: Uuid,
    draft_id: i64,
    title: Option<&str>,
    caption: Option<&str>,
    hashtags: Option<&[String]>,
    platform: Option<&str>,
    content_type: Option<&str>,
    status: Option<&str>,
    notes: Option<&str>,
) -> Result<DraftRow, DbError> {
    let row = sqlx::query_as::<_, DraftRow>(&format!(
        "UPDATE drafts \
         SET title        = COALESCE($3, title), \
             caption      = COALESCE($4, caption), \
             hashtags     = COALESCE($5, hashtags), \
             platform     = COALESCE($6, platform), \
             content_type = COALESCE($7, content_type), \
             status       = COALESCE($8, status), \
             notes        = COALESCE($9, notes), \
             updated_at   = NOW() \
         WHERE id = $1 AND user_id = $2 \
         RETURNING {DRAFT_COLUMNS}"
    ))
    .bind(draft_id)
    .bind(user_id)
    .bind(title)
    .bind(caption)
    .bind(hashtags.map(<[String]>::to_vec))
    .bind(platform)
    .bind(content_type)
    .bind(status)
    .bind(notes)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Deletes a draft by id. Deleting a missing id is a no-op.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_draft(pool: &PgPool, user_id: Uuid, draft_id: i64) -> Result<(), DbError> {
    sqlx::query("DELETE FROM drafts WHERE id = $1 AND user_id = $2")
        .bind(draft_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

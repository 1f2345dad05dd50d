//! Database operations for the `calendar_events` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const EVENT_COLUMNS: &str = "id, user_id, title, date, platform, content_type, draft_id, \
     color, notes, created_at";

/// A row from the `calendar_events` table.
///
/// `draft_id` is a soft reference to `drafts.id`; deleting a draft leaves the
/// event pointing at nothing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CalendarEventRow {
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

/// Returns an account's events ascending by date, optionally constrained to an
/// inclusive date range.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_calendar_events(
    pool: &PgPool,
    user_id: Uuid,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<CalendarEventRow>, DbError> {
    let (start, end) = match range {
        Some((start, end)) => (Some(start), Some(end)),
        None => (None, None),
    };

    let rows = sqlx::query_as::<_, CalendarEventRow>(&format!(
        "SELECT {EVENT_COLUMNS} \
         FROM calendar_events \
         WHERE user_id = $1 \
           AND ($2::date IS NULL OR date >= $2) \
           AND ($3::date IS NULL OR date <= $3) \
         ORDER BY date ASC, id ASC"
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the distinct dates with at least one event in the inclusive range,
/// used for calendar-gap detection.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_event_dates(
    pool: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>, DbError> {
    let dates = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT DISTINCT date \
         FROM calendar_events \
         WHERE user_id = $1 AND date >= $2 AND date <= $3 \
         ORDER BY date",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(dates)
}

/// Creates a new calendar event and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
#[allow(clippy::too_many_arguments)] // public API for full event creation; no sensible grouping
pub async fn create_calendar_event(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    date: NaiveDate,
    platform: Option<&str>,
    content_type: Option<&str>,
    draft_id: Option<i64>,
    color: &str,
    notes: &str,
) -> Result<CalendarEventRow, DbError> {
    let row = sqlx::query_as::<_, CalendarEventRow>(&format!(
        "INSERT INTO calendar_events \
           (user_id, title, date, platform, content_type, draft_id, color, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(title)
    .bind(date)
    .bind(platform)
    .bind(content_type)
    .bind(draft_id)
    .bind(color)
    .bind(notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Updates provided fields on a calendar event.
///
/// Non-nullable fields use `Some(v)` to set and `None` to keep. For nullable
/// columns (`Option<Option<T>>`): outer `None` keeps the current value,
/// `Some(None)` clears to NULL, `Some(Some(v))` sets the value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the account has no event with that id, or
/// [`DbError::Sqlx`] if the update fails.
#[allow(clippy::option_option)] // PATCH semantics: absent vs explicit-null vs value
#[allow(clippy::too_many_arguments)] // public API for partial event update; no sensible grouping
pub async fn update_calendar_event(
    pool: &PgPool,
    user_id: Uuid,
    event_id: i64,
    title: Option<&str>,
    date: Option<NaiveDate>,
    platform: Option<Option<&str>>,
    content_type: Option<Option<&str>>,
    draft_id: Option<Option<i64>>,
    color: Option<&str>,
    notes: Option<&str>,
) -> Result<CalendarEventRow, DbError> {
    let platform_supplied = platform.is_some();
    let platform_val = platform.flatten();
    let content_type_supplied = content_type.is_some();
    let content_type_val = content_type.flatten();
    let draft_id_supplied = draft_id.is_some();
    let draft_id_val = draft_id.flatten();

    let row = sqlx::query_as::<_, CalendarEventRow>(&format!(
        "UPDATE calendar_events \
         SET title        = COALESCE($3, title), \
             date         = COALESCE($4, date), \
             platform     = CASE WHEN $5::BOOL THEN $6 ELSE platform END, \
             content_type = CASE WHEN $7::BOOL THEN $8 ELSE content_type END, \
             draft_id     = CASE WHEN $9::BOOL THEN $10 ELSE draft_id END, \
             color        = COALESCE($11, color), \
             notes        = COALESCE($12, notes) \
         WHERE id = $1 AND user_id = $2 \
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(event_id)
    .bind(user_id)
    .bind(title)
    .bind(date)
    .bind(platform_supplied)
    .bind(platform_val)
    .bind(content_type_supplied)
    .bind(content_type_val)
    .bind(draft_id_supplied)
    .bind(draft_id_val)
    .bind(color)
    .bind(notes)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Deletes a calendar event by id. Deleting a missing id is a no-op.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_calendar_event(
    pool: &PgPool,
    user_id: Uuid,
    event_id: i64,
) -> Result<(), DbError> {
    sqlx::query("DELETE FROM calendar_events WHERE id = $1 AND user_id = $2")
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

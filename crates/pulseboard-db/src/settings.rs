//! Database operations for the `brand_settings` key/value table.
//!
//! Doubles as the credential registry: the Make.com API key is the row with
//! `key = 'make_api_key'`, and inbound webhook requests resolve their owning
//! account by looking the presented key up by value.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Settings key under which an account's Make.com API key is stored.
pub const MAKE_API_KEY_SETTING: &str = "make_api_key";

/// A row from the `brand_settings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandSettingRow {
    pub id: i64,
    pub user_id: Uuid,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inserts or overwrites one setting for an account, keyed on `(user_id, key)`.
///
/// Overwriting is what makes credential regeneration instant: the old value is
/// gone the moment the new row version commits.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_setting(
    pool: &PgPool,
    user_id: Uuid,
    key: &str,
    value: &str,
) -> Result<BrandSettingRow, DbError> {
    let row = sqlx::query_as::<_, BrandSettingRow>(
        "INSERT INTO brand_settings (user_id, key, value) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, key) DO UPDATE SET \
             value      = EXCLUDED.value, \
             updated_at = NOW() \
         RETURNING id, user_id, key, value, created_at, updated_at",
    )
    .bind(user_id)
    .bind(key)
    .bind(value)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns one setting for an account, or `None` if unset.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_setting(
    pool: &PgPool,
    user_id: Uuid,
    key: &str,
) -> Result<Option<BrandSettingRow>, DbError> {
    let row = sqlx::query_as::<_, BrandSettingRow>(
        "SELECT id, user_id, key, value, created_at, updated_at \
         FROM brand_settings \
         WHERE user_id = $1 AND key = $2",
    )
    .bind(user_id)
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Loads all of an account's settings as a key/value map (brand-voice context
/// for prompt rendering).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn load_settings_map(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<HashMap<String, String>, DbError> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT key, value FROM brand_settings WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Resolves the account that owns a presented Make.com API key, or `None` if
/// no account has that key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn resolve_account_by_api_key(
    pool: &PgPool,
    api_key: &str,
) -> Result<Option<Uuid>, DbError> {
    let user_id = sqlx::query_scalar::<_, Uuid>(
        "SELECT user_id FROM brand_settings WHERE key = $1 AND value = $2",
    )
    .bind(MAKE_API_KEY_SETTING)
    .bind(api_key)
    .fetch_optional(pool)
    .await?;

    Ok(user_id)
}

//! Database operations for the `ai_generations` log table (insert-only).

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Records one generation call: the rendered prompt, the raw response, the
/// model identifier, and the reported token usage.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_generation(
    pool: &PgPool,
    user_id: Uuid,
    generation_type: &str,
    prompt: &str,
    response: &str,
    model: &str,
    tokens_used: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO ai_generations \
           (user_id, generation_type, prompt, response, model, tokens_used) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user_id)
    .bind(generation_type)
    .bind(prompt)
    .bind(response)
    .bind(model)
    .bind(tokens_used)
    .execute(pool)
    .await?;

    Ok(())
}

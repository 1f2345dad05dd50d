//! Content generation proxy: renders one of the fixed prompt templates with
//! the account's brand-voice settings and forwards it to the generative-text
//! service. One call per request, no retry.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use pulseboard_core::prompts::{
    caption_prompt, hashtags_prompt, ideas_prompt, post_plan_prompt, BrandContext,
};
use pulseboard_core::GenerationType;

use crate::middleware::AccountId;

use super::{map_db_error, ApiError, AppState};

const DEFAULT_PLATFORM: &str = "instagram";
const DEFAULT_CONTENT_TYPE: &str = "post";
const DEFAULT_PLAN_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub(super) struct GenerateRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub topic: Option<String>,
    pub platform: Option<String>,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateResponse {
    pub content: String,
    pub tokens: i32,
}

/// POST /api/v1/generate — generate a caption, hashtags, ideas, or a
/// multi-day plan.
pub(super) async fn generate_content(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let kind = GenerationType::parse(&body.kind)
        .ok_or_else(|| ApiError::bad_request("Invalid generation type"))?;

    let client = state
        .genai
        .clone()
        .ok_or_else(|| ApiError::internal("generation service is not configured"))?;

    // Brand-voice context is read fresh per request and threaded into the
    // template as an explicit value.
    let settings = pulseboard_db::load_settings_map(&state.pool, account.0)
        .await
        .map_err(|e| map_db_error(&e))?;
    let brand = BrandContext::from_settings(&settings);

    let topic = body.topic.as_deref().unwrap_or("");
    let platform = body.platform.as_deref().unwrap_or(DEFAULT_PLATFORM);
    let content_type = body.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);
    let days = body.days.unwrap_or(DEFAULT_PLAN_DAYS);

    let prompt = match kind {
        GenerationType::Caption => caption_prompt(&brand, topic, platform, content_type),
        GenerationType::Hashtags => hashtags_prompt(&brand, topic, platform),
        GenerationType::Ideas => ideas_prompt(&brand, platform),
        GenerationType::PostPlan => post_plan_prompt(&brand, platform, days),
        // parse() never yields this; suggestions have their own endpoint.
        GenerationType::Suggestions => {
            return Err(ApiError::bad_request("Invalid generation type"))
        }
    };

    let generation = client.generate(&prompt).await.map_err(|e| {
        tracing::error!(error = %e, kind = kind.as_str(), "content generation failed");
        ApiError::internal(e.to_string())
    })?;

    if let Err(e) = pulseboard_db::insert_generation(
        &state.pool,
        account.0,
        kind.as_str(),
        &prompt,
        &generation.text,
        &generation.model,
        generation.tokens,
    )
    .await
    {
        tracing::error!(error = %e, "failed to log generation");
    }

    Ok(Json(GenerateResponse {
        content: generation.text,
        tokens: generation.tokens,
    }))
}

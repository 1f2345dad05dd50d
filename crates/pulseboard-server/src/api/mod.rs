mod calendar;
mod drafts;
mod generate;
mod ingest;
mod insights;
mod settings;
mod suggestions;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use pulseboard_core::{ContentType, DraftStatus, Platform};
use pulseboard_genai::GeminiClient;

use crate::middleware::{request_id, require_session_auth, SessionAuthState};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Absent when no Gemini key is configured; generation endpoints then
    /// fail with a clean error instead of at startup.
    pub genai: Option<Arc<GeminiClient>>,
}

/// An error response: HTTP status plus a flat `{"error": message}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Query parameter shared by the DELETE endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct IdQuery {
    pub id: Option<i64>,
}

pub(super) fn require_id(id: Option<i64>) -> Result<i64, ApiError> {
    id.ok_or_else(|| ApiError::bad_request("id is required"))
}

pub(super) fn map_db_error(error: &pulseboard_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::internal(error.to_string())
}

pub(super) fn validate_platform(value: &str) -> Result<(), ApiError> {
    if Platform::parse(value).is_some() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "platform must be 'instagram' or 'tiktok', got '{value}'"
        )))
    }
}

pub(super) fn validate_content_type(value: &str) -> Result<(), ApiError> {
    if ContentType::parse(value).is_some() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "content_type must be one of post, reel, story, carousel, tiktok, got '{value}'"
        )))
    }
}

pub(super) fn validate_draft_status(value: &str) -> Result<(), ApiError> {
    if DraftStatus::parse(value).is_some() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "status must be one of draft, review, approved, posted, got '{value}'"
        )))
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: SessionAuthState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/insights",
            get(insights::list_insights).post(insights::upsert_insight),
        )
        .route(
            "/api/v1/drafts",
            get(drafts::list_drafts)
                .post(drafts::create_draft)
                .patch(drafts::update_draft)
                .delete(drafts::delete_draft),
        )
        .route(
            "/api/v1/calendar",
            get(calendar::list_events)
                .post(calendar::create_event)
                .patch(calendar::update_event)
                .delete(calendar::delete_event),
        )
        .route(
            "/api/v1/settings/make",
            get(settings::get_make_settings).post(settings::generate_make_key),
        )
        .route("/api/v1/generate", post(generate::generate_content))
        .route(
            "/api/v1/suggestions",
            get(suggestions::calendar_suggestions),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_session_auth,
        ))
}

pub fn build_app(state: AppState, auth: SessionAuthState) -> Router {
    // The webhook does its own x-api-key auth against the credential registry
    // and must not sit behind session auth.
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/webhooks/make", post(ingest::ingest_metrics));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match pulseboard_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

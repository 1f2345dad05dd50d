use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The account a request acts on behalf of, resolved from its session
/// credential and stored as a request extension. Every row a handler writes
/// is stamped with this id.
#[derive(Debug, Clone, Copy)]
pub struct AccountId(pub Uuid);

/// Session auth settings used by middleware.
///
/// Identity itself is delegated to an external provider; the server only
/// trusts an env-configured mapping from opaque bearer tokens to account ids.
#[derive(Debug, Clone)]
pub struct SessionAuthState {
    tokens: Arc<Vec<(String, Uuid)>>,
    pub enabled: bool,
    dev_account: Uuid,
}

impl SessionAuthState {
    /// Builds auth config from `PULSEBOARD_SESSION_TOKENS`, a comma-separated
    /// list of `token=account-uuid` pairs.
    ///
    /// In development, empty/missing tokens disable auth for local iteration
    /// and every request acts as a fixed local account. In non-development
    /// envs, empty/missing tokens fail startup.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("PULSEBOARD_SESSION_TOKENS").unwrap_or_default();
        let mut tokens = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (token, account) = entry.split_once('=').ok_or_else(|| {
                anyhow::anyhow!(
                    "PULSEBOARD_SESSION_TOKENS entries must be token=account-uuid pairs"
                )
            })?;
            let account = account.trim().parse::<Uuid>().map_err(|e| {
                anyhow::anyhow!("PULSEBOARD_SESSION_TOKENS has an invalid account uuid: {e}")
            })?;
            let token = token.trim();
            if token.is_empty() {
                anyhow::bail!("PULSEBOARD_SESSION_TOKENS has an empty token");
            }
            tokens.push((token.to_owned(), account));
        }

        if tokens.is_empty() {
            if is_development {
                tracing::warn!(
                    "PULSEBOARD_SESSION_TOKENS not set; session auth disabled in development environment"
                );
                return Ok(Self::disabled());
            }

            anyhow::bail!(
                "PULSEBOARD_SESSION_TOKENS is required outside development; provide comma-separated token=account-uuid pairs"
            );
        }

        Ok(Self::new(tokens))
    }

    /// Auth enabled with an explicit token map.
    #[must_use]
    pub fn new(tokens: Vec<(String, Uuid)>) -> Self {
        Self {
            tokens: Arc::new(tokens),
            enabled: true,
            dev_account: Uuid::nil(),
        }
    }

    /// Auth disabled; every request acts as the fixed local dev account.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            tokens: Arc::new(Vec::new()),
            enabled: false,
            dev_account: Uuid::nil(),
        }
    }

    /// Resolves a presented token to its account, comparing every configured
    /// token in constant time.
    fn resolve(&self, token: &str) -> Option<Uuid> {
        let mut found = None;
        for (candidate, account) in self.tokens.iter() {
            if bool::from(candidate.as_bytes().ct_eq(token.as_bytes())) {
                found = Some(*account);
            }
        }
        found
    }
}

#[derive(Debug, Serialize)]
struct UnauthorizedBody {
    error: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware resolving the session bearer token to an [`AccountId`].
///
/// With auth disabled (development), every request acts as the dev account.
pub async fn require_session_auth(
    State(auth): State<SessionAuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        req.extensions_mut().insert(AccountId(auth.dev_account));
        return next.run(req).await;
    }

    let account = extract_bearer_token(req.headers().get(AUTHORIZATION))
        .and_then(|token| auth.resolve(token));

    match account {
        Some(account) => {
            req.extensions_mut().insert(AccountId(account));
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(UnauthorizedBody {
                error: "Unauthorized",
            }),
        )
            .into_response(),
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn resolve_matches_exact_token_only() {
        let account = Uuid::new_v4();
        let auth = SessionAuthState::new(vec![("session-abc".to_string(), account)]);
        assert_eq!(auth.resolve("session-abc"), Some(account));
        assert_eq!(auth.resolve("session-ab"), None);
        assert_eq!(auth.resolve("session-abcd"), None);
        assert_eq!(auth.resolve(""), None);
    }

    #[test]
    fn resolve_distinguishes_accounts() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let auth = SessionAuthState::new(vec![
            ("token-a".to_string(), a),
            ("token-b".to_string(), b),
        ]);
        assert_eq!(auth.resolve("token-a"), Some(a));
        assert_eq!(auth.resolve("token-b"), Some(b));
    }

    #[test]
    fn disabled_state_reports_disabled() {
        let auth = SessionAuthState::disabled();
        assert!(!auth.enabled);
    }
}

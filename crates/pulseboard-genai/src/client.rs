//! HTTP client for the Gemini `generateContent` REST API.
//!
//! Wraps `reqwest` with a bounded timeout, API key management, and typed
//! response deserialization. API-level failures (non-2xx with an error body)
//! surface as [`GenAiError::Api`]; elapsed timeouts as [`GenAiError::Timeout`].

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GenAiError;
use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, Generation, Part,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Client for the Gemini generative-text API.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Creates a new client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, GenAiError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GenAiError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GenAiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pulseboard/0.1 (content-generation)")
            .build()
            .map_err(GenAiError::Http)?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // join() appends the endpoint path rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GenAiError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// The model identifier requests are sent to, recorded on generation logs.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one prompt and returns the generated text plus token usage.
    ///
    /// No retry is performed; callers see exactly one round trip.
    ///
    /// # Errors
    ///
    /// - [`GenAiError::Timeout`] if the call exceeds the configured budget.
    /// - [`GenAiError::Http`] on network failure.
    /// - [`GenAiError::Api`] if the API returns an error status or a response
    ///   with no candidates.
    /// - [`GenAiError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn generate(&self, prompt: &str) -> Result<Generation, GenAiError> {
        let url = self.build_url()?;
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
        };

        let response = self.client.post(url.clone()).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenAiError::Api(extract_api_error(&body, status.as_u16())));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GenAiError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GenAiError::Api("response contained no candidates".to_owned()))?;

        let tokens = parsed
            .usage_metadata
            .and_then(|u| u.total_token_count)
            .unwrap_or(0);

        Ok(Generation {
            text,
            tokens,
            model: self.model.clone(),
        })
    }

    /// Builds `{base}/v1beta/models/{model}:generateContent?key={api_key}`.
    fn build_url(&self) -> Result<Url, GenAiError> {
        let mut url = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| GenAiError::Api(format!("invalid model path: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

/// Pulls the `error.message` field out of a Gemini error body, falling back
/// to a generic status-code message.
fn extract_api_error(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::with_base_url("test-key", "gemini-2.0-flash", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_includes_model_and_key() {
        let client = test_client("https://generativelanguage.googleapis.com");
        let url = client.build_url().expect("url");
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=test-key"
        );
    }

    #[test]
    fn build_url_strips_trailing_slash() {
        let client = test_client("http://127.0.0.1:9/");
        let url = client.build_url().expect("url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.0-flash:generateContent?key=test-key"
        );
    }

    #[test]
    fn extract_api_error_prefers_message_field() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(extract_api_error(body, 400), "API key not valid");
    }

    #[test]
    fn extract_api_error_falls_back_to_status() {
        assert_eq!(
            extract_api_error("not json", 503),
            "request failed with status 503"
        );
    }
}

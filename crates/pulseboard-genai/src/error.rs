use thiserror::Error;

/// Errors returned by the Gemini API client.
#[derive(Debug, Error)]
pub enum GenAiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The request exceeded the configured timeout budget.
    #[error("generation timed out")]
    Timeout,

    /// The API returned an error status with a message.
    #[error("Gemini API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for GenAiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenAiError::Timeout
        } else {
            GenAiError::Http(e)
        }
    }
}

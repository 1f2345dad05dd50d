//! Client for the Gemini `generateContent` REST API.

mod client;
mod error;
mod types;

pub use client::GeminiClient;
pub use error::GenAiError;
pub use types::Generation;

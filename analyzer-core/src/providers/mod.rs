//! Vision model provider abstraction and implementations.
//!
//! The analyzer talks to the model through [`VisionProvider`] so the hosted
//! Gemini backend can be swapped for the mock in tests.

pub mod gemini;
pub mod mock;

use crate::intake::UploadedImage;
use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

/// Error type for provider operations.
///
/// The variants feed logs and metric labels; users see the `Display` text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Response blocked by safety filters")]
    ContentFiltered,

    #[error("Model returned no text{}", .0.as_deref().map(|r| format!(" (blocked: {})", r)).unwrap_or_default())]
    EmptyResponse(Option<String>),

    #[error("Failed to parse response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Network(_) => "network",
            ProviderError::Api { .. } => "api",
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::EmptyResponse(_) => "empty_response",
            ProviderError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// A multimodal model that answers one prompt about one image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send `prompt` followed by `image` and return the model's text unmodified.
    async fn generate(
        &self,
        credential: &Secret<String>,
        prompt: &str,
        image: &UploadedImage,
    ) -> Result<String, ProviderError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

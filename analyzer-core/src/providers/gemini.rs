//! Gemini vision provider.
//!
//! Sends one prompt and one inline image to the `generateContent` endpoint and
//! returns the text of the first candidate.

use super::{ProviderError, VisionProvider};
use crate::config::GeminiSettings;
use crate::intake::UploadedImage;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the API key, kept out of the URL so it never lands in logs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    pub request_timeout: Option<Duration>,
}

impl From<&GeminiSettings> for GeminiConfig {
    fn from(settings: &GeminiSettings) -> Self {
        Self {
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            request_timeout: settings.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Gemini vision provider.
pub struct GeminiVisionProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiVisionProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base, self.config.model
        )
    }

    fn build_request(prompt: &str, image: &UploadedImage) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.to_base64(),
                        },
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl VisionProvider for GeminiVisionProvider {
    async fn generate(
        &self,
        credential: &Secret<String>,
        prompt: &str,
        image: &UploadedImage,
    ) -> Result<String, ProviderError> {
        let request = Self::build_request(prompt, image);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            image_bytes = image.size(),
            mime_type = image.mime_type(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url())
            .header(API_KEY_HEADER, credential.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited(message));
            }

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        api_response.into_text()
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Pull `error.message` out of a Gemini error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> Result<String, ProviderError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ProviderError::EmptyResponse(block_reason));
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text),
                _ => None,
            })
            .collect();

        if !text.is_empty() {
            return Ok(text);
        }

        match candidate.finish_reason.as_deref() {
            Some("SAFETY") => Err(ProviderError::ContentFiltered),
            reason => Err(ProviderError::EmptyResponse(
                block_reason.or_else(|| reason.map(str::to_string)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<String, ProviderError> {
        serde_json::from_value::<GenerateContentResponse>(value)
            .unwrap()
            .into_text()
    }

    #[test]
    fn joins_all_text_parts_of_first_candidate() {
        let text = parse(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "1. Amoxicillin\n"}, {"text": "   - Purpose: infection"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(text, "1. Amoxicillin\n   - Purpose: infection");
    }

    #[test]
    fn blocked_prompt_is_empty_response_with_reason() {
        let err = parse(json!({"promptFeedback": {"blockReason": "OTHER"}})).unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse(Some("OTHER".into())));
    }

    #[test]
    fn safety_finish_without_text_is_content_filtered() {
        let err = parse(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap_err();
        assert_eq!(err, ProviderError::ContentFiltered);
    }

    #[test]
    fn request_puts_prompt_before_single_image() {
        let bytes = crate::intake::tests::encoded(2, 2, image::ImageFormat::Png);
        let image = UploadedImage::decode("a.png", bytes).unwrap();
        let request = GeminiVisionProvider::build_request("read this", &image);
        let value = serde_json::to_value(&request).unwrap();

        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "read this");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], image.to_base64());
        assert_eq!(value["contents"][0]["role"], "user");
    }

    #[test]
    fn error_message_prefers_structured_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("API key not valid."));
        assert_eq!(error_message("gateway down").as_deref(), Some("gateway down"));
        assert_eq!(error_message("  "), None);
    }
}

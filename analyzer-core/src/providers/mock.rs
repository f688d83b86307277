//! Mock provider for testing.

use super::{ProviderError, VisionProvider};
use crate::intake::UploadedImage;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use std::sync::Mutex;

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub credential: String,
    pub prompt: String,
    pub file_name: String,
    pub mime_type: String,
}

/// Mock vision provider returning a scripted result and recording every call.
pub struct MockVisionProvider {
    response: Mutex<Result<String, ProviderError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockVisionProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_result(Ok(text.into()))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<String, ProviderError>) -> Self {
        Self {
            response: Mutex::new(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Change what subsequent calls return.
    pub fn set_result(&self, result: Result<String, ProviderError>) {
        *self.response.lock().unwrap_or_else(|e| e.into_inner()) = result;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn generate(
        &self,
        credential: &Secret<String>,
        prompt: &str,
        image: &UploadedImage,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                credential: credential.expose_secret().clone(),
                prompt: prompt.to_string(),
                file_name: image.file_name.clone(),
                mime_type: image.mime_type().to_string(),
            });

        self.response
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn model(&self) -> &str {
        "mock-vision"
    }
}

//! Gemini provider against a mock HTTP server.

use analyzer_core::intake::UploadedImage;
use analyzer_core::mode::TABLET_STRIP_PROMPT;
use analyzer_core::providers::gemini::{GeminiConfig, GeminiVisionProvider};
use analyzer_core::providers::{ProviderError, VisionProvider};
use image::{ImageBuffer, ImageFormat, Rgb};
use secrecy::Secret;
use serde_json::json;
use std::io::Cursor;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const ENDPOINT: &str = "/models/gemini-test:generateContent";

fn provider(server: &MockServer) -> GeminiVisionProvider {
    GeminiVisionProvider::new(GeminiConfig {
        api_base: server.uri(),
        model: MODEL.to_string(),
        request_timeout: Some(Duration::from_secs(5)),
    })
    .expect("client builds")
}

fn jpeg() -> UploadedImage {
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(10, 6, Rgb([200, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    buffer.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    UploadedImage::decode("strip.jpg", out.into_inner()).unwrap()
}

fn key() -> Secret<String> {
    Secret::new("abc123".to_string())
}

#[tokio::test]
async fn sends_prompt_then_image_with_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Paracetamol 500mg, Exp 2026-01"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let image = jpeg();
    let text = provider(&server)
        .generate(&key(), TABLET_STRIP_PROMPT, &image)
        .await
        .unwrap();

    assert_eq!(text, "Paracetamol 500mg, Exp 2026-01");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().is_none(), "key must not be in the URL");

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 1);
    let parts = contents[0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["text"], TABLET_STRIP_PROMPT);
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
    assert_eq!(parts[1]["inline_data"]["data"], image.to_base64());
}

#[tokio::test]
async fn invalid_key_maps_to_api_error_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&key(), TABLET_STRIP_PROMPT, &jpeg())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::Api {
            status: 400,
            message: "API key not valid. Please pass a valid API key.".into()
        }
    );
}

#[tokio::test]
async fn quota_exhaustion_is_rate_limited_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted (e.g. check quota).", "status": "RESOURCE_EXHAUSTED"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&key(), TABLET_STRIP_PROMPT, &jpeg())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::RateLimited("Resource has been exhausted (e.g. check quota).".into())
    );
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&key(), TABLET_STRIP_PROMPT, &jpeg())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    // Nothing listens on port 1.
    let provider = GeminiVisionProvider::new(GeminiConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        model: MODEL.to_string(),
        request_timeout: Some(Duration::from_secs(2)),
    })
    .unwrap();

    let err = provider
        .generate(&key(), TABLET_STRIP_PROMPT, &jpeg())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Network(_)));
}

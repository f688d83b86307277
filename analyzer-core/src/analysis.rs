//! The analysis invoker: one outbound call per request, result shown verbatim.

use crate::providers::{ProviderError, VisionProvider};
use crate::session::ReadyAnalysis;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Result of the last analysis as shown on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The model's text, unmodified.
    Success(String),
    /// One user-facing error line.
    Failure(String),
}

impl AnalysisOutcome {
    fn label(&self) -> &'static str {
        match self {
            AnalysisOutcome::Success(_) => "success",
            AnalysisOutcome::Failure(_) => "failure",
        }
    }
}

impl From<Result<String, ProviderError>> for AnalysisOutcome {
    fn from(result: Result<String, ProviderError>) -> Self {
        match result {
            Ok(text) => AnalysisOutcome::Success(text),
            Err(e) => AnalysisOutcome::Failure(format!("Error while processing: {}", e)),
        }
    }
}

/// Sends the selected prompt and the image to the provider.
#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn VisionProvider>,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Run one analysis. Failures are not retried.
    pub async fn analyze(&self, ready: ReadyAnalysis<'_>) -> Result<String, ProviderError> {
        let prompt = ready.mode.prompt();
        let mode = ready.mode.as_str();
        let start = Instant::now();

        let result = self
            .provider
            .generate(&ready.credential.secret(), prompt, ready.image)
            .await;

        histogram!("analysis_duration_seconds", "mode" => mode)
            .record(start.elapsed().as_secs_f64());

        match &result {
            Ok(text) => {
                tracing::info!(
                    model = self.provider.model(),
                    mode,
                    image_bytes = ready.image.size(),
                    response_len = text.len(),
                    "Analysis complete"
                );
                counter!("analysis_requests_total", "mode" => mode, "outcome" => "success")
                    .increment(1);
            }
            Err(e) => {
                tracing::warn!(
                    model = self.provider.model(),
                    mode,
                    error_kind = e.kind(),
                    error = %e,
                    "Analysis failed"
                );
                counter!("analysis_requests_total", "mode" => mode, "outcome" => e.kind())
                    .increment(1);
            }
        }

        result
    }

    /// Run one analysis and convert the result for display.
    pub async fn run(&self, ready: ReadyAnalysis<'_>) -> AnalysisOutcome {
        let outcome = AnalysisOutcome::from(self.analyze(ready).await);
        tracing::debug!(outcome = outcome.label(), "Recorded analysis outcome");
        outcome
    }
}

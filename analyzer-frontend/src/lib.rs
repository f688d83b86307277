pub mod handlers;
pub mod models;
pub mod startup;

use analyzer_core::analysis::Analyzer;
use analyzer_core::providers::VisionProvider;
use models::IdleSessionStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub model: String,
    pub metrics: Option<PrometheusHandle>,
    pub sessions: IdleSessionStore,
}

impl AppState {
    pub fn new(provider: Arc<dyn VisionProvider>, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            model: provider.model().to_string(),
            analyzer: Analyzer::new(provider),
            metrics,
            sessions: IdleSessionStore::default(),
        }
    }
}

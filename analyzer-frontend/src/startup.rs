use analyzer_core::config::ServerSettings;
use analyzer_core::middleware::{
    metrics::metrics_middleware, request_id::request_id_middleware,
    security_headers::security_headers_middleware,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::handlers::{
    analysis::{analyze, upload},
    app::{health_check, index},
    metrics::metrics,
    session::{reset, set_credential, set_mode},
};
use crate::AppState;

pub fn build_router(state: AppState, settings: &ServerSettings) -> Router {
    // Credential, image and last result live only in this in-memory store.
    let session_layer = SessionManagerLayer::new(state.sessions.clone())
        .with_secure(settings.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            settings.session_idle_minutes,
        )));

    Router::new()
        .route("/", get(index))
        .route("/credential", post(set_credential))
        .route("/mode", post(set_mode))
        .route("/upload", post(upload))
        .route("/analyze", post(analyze))
        .route("/reset", post(reset))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(analyzer_core::middleware::request_id::REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    path = %request.uri().path(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost, so the trace span sees the assigned id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

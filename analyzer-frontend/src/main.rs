use analyzer_core::config::Settings;
use analyzer_core::observability::{init_metrics, init_tracing, shutdown_tracing};
use analyzer_core::providers::gemini::{GeminiConfig, GeminiVisionProvider};
use analyzer_core::providers::VisionProvider;
use analyzer_frontend::startup::build_router;
use analyzer_frontend::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_sessions::ExpiredDeletion;
use tracing::info;

/// How often expired sessions are purged from memory.
const SESSION_SWEEP_SECS: u64 = 60;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("analyzer-frontend", &settings.logging)?;
    let metrics_handle = init_metrics()?;

    let provider = GeminiVisionProvider::new(GeminiConfig::from(&settings.gemini))
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
    info!(
        model = %provider.model(),
        api_base = %settings.gemini.api_base,
        "Initialized Gemini vision provider"
    );

    let state = AppState::new(Arc::new(provider), Some(metrics_handle));

    let deletion_task = tokio::spawn(
        state
            .sessions
            .clone()
            .continuously_delete_expired(Duration::from_secs(SESSION_SWEEP_SECS)),
    );
    let app = build_router(state, &settings.server);

    let address = settings.address();
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting analyzer-frontend on {}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            anyhow::anyhow!("Server error: {}", e)
        })?;

    deletion_task.abort();
    shutdown_tracing();
    Ok(())
}

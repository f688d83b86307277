use crate::config::LoggingSettings;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `settings.level`. Spans go to an OTLP collector only
/// when `settings.otlp_endpoint` is set.
pub fn init_tracing(service_name: &str, settings: &LoggingSettings) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.level));

    let telemetry = match settings.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let tracer = build_tracer(service_name, endpoint)?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let (json_layer, text_layer) = if settings.json {
        let layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .json()
            .flatten_event(true);
        (Some(layer), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer().with_target(true)))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(telemetry)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    Ok(())
}

fn build_tracer(service_name: &str, endpoint: &str) -> anyhow::Result<sdktrace::Tracer> {
    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", service_name.to_string()),
        ])))
        .install_batch(runtime::Tokio)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to initialize OTLP tracer for service '{}' at endpoint '{}': {}",
                service_name,
                endpoint,
                e
            )
        })
}

/// Flush pending spans. A no-op when no exporter was installed.
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}

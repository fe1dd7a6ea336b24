use crate::config::Environment;
use opentelemetry::global::BoxedTracer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber: JSON lines in production, pretty output in
/// development.
///
/// `RUST_LOG` wins over `default_directive` (e.g. "info") when set.
pub fn setup_logging(environment: Environment, default_directive: &str) {
    init_subscriber(environment, default_directive, None);
}

/// Shared by [`setup_logging`] and [`crate::TelemetryGuard`]; the latter passes
/// a tracer so spans are also exported over OTLP.
pub(crate) fn init_subscriber(
    environment: Environment,
    default_directive: &str,
    tracer: Option<BoxedTracer>,
) {
    let otel_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let registry = tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(otel_layer);

    match environment {
        Environment::Production => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_level(true))
                .init();
        }
        Environment::Development => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_ansi(true))
                .init();
        }
    }
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

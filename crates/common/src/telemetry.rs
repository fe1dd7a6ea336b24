use crate::Environment;
use crate::logging::init_subscriber;
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    trace::{Sampler, SdkTracerProvider},
};
use opentelemetry_semantic_conventions::attribute::{SERVICE_NAME, SERVICE_VERSION};
use std::time::Duration;

const DEFAULT_METRICS_INTERVAL: Duration = Duration::from_secs(10);

/// Where and how to export spans and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// OTLP gRPC collector, e.g. "http://localhost:4317"
    pub endpoint: String,
    pub environment: Environment,
    /// Log filter used when RUST_LOG is not set
    pub log_directive: String,
    pub metrics_interval: Duration,
}

impl TelemetryConfig {
    pub fn new(service_name: &str, endpoint: &str, environment: Environment) -> Self {
        Self {
            service_name: service_name.to_string(),
            endpoint: endpoint.to_string(),
            environment,
            log_directive: "info".to_string(),
            metrics_interval: DEFAULT_METRICS_INTERVAL,
        }
    }

    pub fn with_log_directive(mut self, directive: &str) -> Self {
        self.log_directive = directive.to_string();
        self
    }
}

/// Installs the OTLP tracer and meter providers plus the log subscriber, and
/// flushes both providers when dropped.
///
/// ```ignore
/// let config = TelemetryConfig::new("classify", "http://localhost:4317", Environment::Production);
/// let _telemetry = TelemetryGuard::init(&config)?;
/// ```
pub struct TelemetryGuard {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl TelemetryGuard {
    pub fn init(config: &TelemetryConfig) -> anyhow::Result<Self> {
        global::set_text_map_propagator(TraceContextPropagator::new());

        let resource = Resource::builder()
            .with_attributes([
                KeyValue::new(SERVICE_NAME, config.service_name.clone()),
                KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
            ])
            .build();

        let span_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&config.endpoint)
            .build()?;

        let tracer_provider = SdkTracerProvider::builder()
            .with_resource(resource.clone())
            .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
            .with_batch_exporter(span_exporter)
            .build();
        global::set_tracer_provider(tracer_provider.clone());

        let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(&config.endpoint)
            .build()?;

        let reader = PeriodicReader::builder(metric_exporter)
            .with_interval(config.metrics_interval)
            .build();

        let meter_provider = SdkMeterProvider::builder()
            .with_resource(resource)
            .with_reader(reader)
            .build();
        global::set_meter_provider(meter_provider.clone());

        init_subscriber(
            config.environment,
            &config.log_directive,
            Some(global::tracer(config.service_name.clone())),
        );

        tracing::debug!(
            service = %config.service_name,
            endpoint = %config.endpoint,
            "Telemetry export enabled"
        );

        Ok(Self {
            tracer_provider,
            meter_provider,
        })
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Err(e) = self.tracer_provider.shutdown() {
            eprintln!("Failed to shutdown tracer provider: {:?}", e);
        }
        if let Err(e) = self.meter_provider.shutdown() {
            eprintln!("Failed to shutdown meter provider: {:?}", e);
        }
    }
}

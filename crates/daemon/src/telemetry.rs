//! OpenTelemetry export
//!
//! Active only when built with the `telemetry` feature and
//! `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//!
//! ```text
//! OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
//! OTEL_SERVICE_NAME=dontq-dev \
//!     ./dontq
//! ```

#[cfg(feature = "telemetry")]
pub type OtelLayer = tracing_opentelemetry::OpenTelemetryLayer<
    tracing_subscriber::Registry,
    opentelemetry_sdk::trace::Tracer,
>;

#[cfg(not(feature = "telemetry"))]
pub type OtelLayer = tracing_subscriber::layer::Identity;

#[cfg(feature = "telemetry")]
const DEFAULT_SERVICE_NAME: &str = "dontq";

/// Tracing layer exporting spans over OTLP, if configured
///
/// Runs before the subscriber is installed, so problems are returned as
/// messages for the caller to log afterwards.
pub fn otel_layer() -> (Option<OtelLayer>, Option<String>) {
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return (None, None);
    };

    #[cfg(feature = "telemetry")]
    {
        match build_layer(&endpoint) {
            Ok(layer) => (Some(layer), None),
            Err(e) => (
                None,
                Some(format!("Failed to initialize OpenTelemetry: {:#}", e)),
            ),
        }
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = endpoint;
        (
            None,
            Some("OTEL_EXPORTER_OTLP_ENDPOINT set but feature 'telemetry' not enabled".to_string()),
        )
    }
}

#[cfg(feature = "telemetry")]
fn build_layer(endpoint: &str) -> anyhow::Result<OtelLayer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use opentelemetry_sdk::Resource;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.clone(),
        )]))
        .build();

    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer))
}

/// Flush pending spans on shutdown
pub fn shutdown() {
    #[cfg(feature = "telemetry")]
    opentelemetry::global::shutdown_tracer_provider();
}

//! Tracing setup for hosts embedding the conversation engine.
//!
//! Every engine entry point is instrumented, so with telemetry installed each
//! conversation turn exports a span named after the call (`begin_dialog`,
//! `continue_dialog`, `resume_dialog`) carrying the dialog id.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{KeyValue, global};
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
};
use opentelemetry_stdout::SpanExporter;
use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Settings for [`init_telemetry`].
///
/// # Examples
///
/// ```
/// use colloquy_core::TelemetryConfig;
///
/// let config = TelemetryConfig::new("support-bot")
///     .with_log_level("colloquy_conversation=debug")
///     .with_json_logs(true);
/// assert_eq!(config.service_name, "support-bot");
/// assert!(config.json_logs);
/// ```
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Reported as `service.name` on every exported span
    pub service_name: String,
    /// `EnvFilter` directives; defaults to `RUST_LOG`, else `info`
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl TelemetryConfig {
    /// Settings for `service_name` with the log level taken from the environment.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: false,
        }
    }

    /// Override the filter directives.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Toggle JSON log lines.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::new("colloquy")
    }
}

/// Install a human-readable `fmt` subscriber filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::from_default_env()),
        )
        .try_init()?;
    Ok(())
}

/// Install `fmt` logs plus an OpenTelemetry layer exporting spans to stdout.
///
/// The returned provider is also registered globally. Hand it to
/// [`shutdown_telemetry`] before exit so buffered spans are flushed.
///
/// # Errors
///
/// Returns error if the filter directives are invalid or a global subscriber
/// is already installed.
pub fn init_telemetry(
    config: &TelemetryConfig,
) -> Result<TracerProvider, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(&config.log_level)?;

    let provider = TracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_id_generator(RandomIdGenerator::default())
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]))
        .build();
    let otel_layer =
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()));

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;
    global::set_tracer_provider(provider.clone());

    tracing::debug!(service = %config.service_name, "Telemetry initialized");
    Ok(provider)
}

/// Flush pending spans and stop the exporter.
///
/// # Errors
///
/// Returns error if the provider was already shut down.
pub fn shutdown_telemetry(provider: TracerProvider) -> Result<(), Box<dyn std::error::Error>> {
    provider.shutdown()?;
    Ok(())
}

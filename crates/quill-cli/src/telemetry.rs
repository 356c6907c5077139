//! Tracing setup.
//!
//! Logs go to stderr so stdout stays reserved for command output. The
//! filter comes from `QUILL_LOG` (`warn` if unset) and `QUILL_LOG_FORMAT=json`
//! switches to one JSON object per line. With the `otel` feature, spans and
//! log events are also exported over OTLP/HTTP when
//! `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

use std::env;
use std::io;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_VAR: &str = "QUILL_LOG";
const LOG_FORMAT_VAR: &str = "QUILL_LOG_FORMAT";
const DEFAULT_FILTER: &str = "warn";

/// Keeps exporters alive until the command finishes; flushes on drop.
#[derive(Default)]
pub struct TelemetryGuard {
    #[cfg(feature = "otel")]
    providers: Option<otel::Providers>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        #[cfg(feature = "otel")]
        if let Some(providers) = self.providers.take() {
            providers.shutdown();
        }
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn json_requested() -> bool {
    env::var(LOG_FORMAT_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("json"))
}

/// Install the global subscriber.
#[cfg(not(feature = "otel"))]
pub fn init() -> TelemetryGuard {
    let json = json_requested();
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(io::stderr)))
        .try_init();
    TelemetryGuard::default()
}

/// Install the global subscriber, exporting to OTLP when configured.
#[cfg(feature = "otel")]
pub fn init() -> TelemetryGuard {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;

    let providers = if env::var_os(otel::ENDPOINT_VAR).is_some() {
        match otel::Providers::build() {
            Ok(p) => Some(p),
            Err(err) => {
                eprintln!("WARNING: OTLP export disabled: {err:#}");
                None
            }
        }
    } else {
        None
    };

    let json = json_requested();
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(io::stderr)))
        .with(providers.as_ref().map(|p| {
            tracing_opentelemetry::layer().with_tracer(p.tracer.tracer(otel::SERVICE_NAME))
        }))
        .with(
            providers
                .as_ref()
                .map(|p| OpenTelemetryTracingBridge::new(&p.logger)),
        )
        .try_init();

    TelemetryGuard { providers }
}

#[cfg(feature = "otel")]
mod otel {
    use anyhow::Result;
    use opentelemetry_otlp::{LogExporter, SpanExporter};
    use opentelemetry_sdk::logs::SdkLoggerProvider;
    use opentelemetry_sdk::trace::SdkTracerProvider;
    use opentelemetry_sdk::Resource;

    pub const ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
    pub const SERVICE_NAME: &str = "quill";

    pub struct Providers {
        pub tracer: SdkTracerProvider,
        pub logger: SdkLoggerProvider,
    }

    impl Providers {
        pub fn build() -> Result<Self> {
            let resource = Resource::builder().with_service_name(SERVICE_NAME).build();

            let spans = SpanExporter::builder().with_http().build()?;
            let tracer = SdkTracerProvider::builder()
                .with_resource(resource.clone())
                .with_batch_exporter(spans)
                .build();

            let logs = LogExporter::builder().with_http().build()?;
            let logger = SdkLoggerProvider::builder()
                .with_resource(resource)
                .with_batch_exporter(logs)
                .build();

            Ok(Self { tracer, logger })
        }

        pub fn shutdown(self) {
            if let Err(err) = self.tracer.shutdown() {
                eprintln!("WARNING: failed to flush spans: {err}");
            }
            if let Err(err) = self.logger.shutdown() {
                eprintln!("WARNING: failed to flush logs: {err}");
            }
        }
    }
}

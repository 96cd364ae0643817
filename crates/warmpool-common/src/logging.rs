//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;
use warmpool_config::TelemetryConfig;

/// Build the log filter: `RUST_LOG` wins, otherwise the configured level
pub fn build_env_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.tracing_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber
///
/// Output has no ANSI colors and no timestamps since the serverless host
/// already timestamps every captured line. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn init_tracing(config: &TelemetryConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(config))
        .with_target(false)
        .with_ansi(false)
        .without_time();

    let installed = if config.json_logs {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::info!(service = %config.service_name, "Tracing initialized");
    }
}

use archiver_core::LogFormat;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "archiver=info";

#[derive(Debug, Error)]
#[error("Failed to initialise tracing: {0}")]
pub struct TelemetryError(String);

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

/// Initialize tracing for the process. Fails if a global subscriber is
/// already installed.
pub fn init_telemetry(format: LogFormat, environment: &str) -> Result<(), TelemetryError> {
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };
    result.map_err(|e| TelemetryError(e.to_string()))?;

    tracing::info!(
        environment = %environment,
        format = ?format,
        "Tracing initialised"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown (nothing buffered)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_LOG_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        // First call may already have happened in another test thread.
        let _ = init_telemetry(LogFormat::Pretty, "test");
        assert!(init_telemetry(LogFormat::Json, "test").is_err());
    }
}

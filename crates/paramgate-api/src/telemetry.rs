//! # Tracing Setup
//!
//! Subscriber initialisation for services embedding the validation layer,
//! and the `TraceLayer` that gives every request a span.
//!
//! The filter comes from `RUST_LOG` (default `info`). Set
//! `PARAMGATE_LOG_FORMAT=json` for one JSON object per event.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed.
pub type TelemetryError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install the global tracing subscriber.
pub fn init_tracing() -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("PARAMGATE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
    }
}

/// Build the request tracing layer.
///
/// Each request gets a span with method, URI, and status code.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // The first call may race other tests in this binary; only the
        // second is guaranteed to find a subscriber installed.
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }

    #[test]
    fn test_trace_layer_constructs() {
        let _layer = trace_layer();
    }
}

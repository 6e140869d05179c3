/*!
 * Structured Tracing
 * Subscriber setup and call correlation for bridge requests
 */

use tracing::{info, span, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured tracing on stderr
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - WIFI_BIND_TRACE_JSON: Enable JSON output (default: false)
///
/// Stdout is left untouched so it can carry bridge replies.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one bridge call
pub fn call_span(method: &str, trace_id: &str) -> Span {
    span!(Level::INFO, "bridge_call", method, trace_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_ids_are_unique() {
        let a = generate_trace_id();
        let b = generate_trace_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}

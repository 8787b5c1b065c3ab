//! Logging setup for LexCase Core

use crate::config::LogConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops (useful in tests).
pub fn init_tracing(config: &LogConfig) {
    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already initialized");
    }
}

//! Logging setup
//!
//! The engine only emits `tracing` events. Binaries and tests that want to see
//! them call [`init_tracing`] once.

use tracing_subscriber::EnvFilter;

use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};

/// Resolve the log filter: `TABULA_LOG`, then `RUST_LOG`, then the default
pub fn log_filter() -> String {
    std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string())
}

/// Install a compact stderr subscriber
///
/// Returns false when a global subscriber is already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_new(log_filter())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// Install a JSON subscriber for log shipping
pub fn init_json_tracing() -> bool {
    let filter = EnvFilter::try_new(log_filter())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .json()
        .with_current_span(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

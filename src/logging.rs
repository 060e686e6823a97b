//! Logging setup for the provider.
//!
//! Logs go to **stderr**; stdout belongs to the host protocol.
//!
//! # Environment Variables
//!
//! - `TWINGATE_LOG`: log filter for this provider (e.g. `debug`,
//!   `hemmer_provider_twingate=debug`)
//! - `RUST_LOG`: used when `TWINGATE_LOG` is unset
//!
//! ```bash
//! # Log every GraphQL request
//! TWINGATE_LOG=hemmer_provider_twingate::client=debug ./hemmer-provider-twingate
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Provider-specific filter variable, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "TWINGATE_LOG";

/// Resolve the filter: `TWINGATE_LOG`, then `RUST_LOG`, then `default_level`.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn try_init_with(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}

/// Install the stderr subscriber at `info` unless the environment says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Like [`init_logging`], with `default_level` when neither variable is set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    if !try_init_with(default_level) {
        panic!("a global tracing subscriber is already set");
    }
}

/// Try to initialize logging, returning false if already initialized.
pub fn try_init_logging() -> bool {
    try_init_with("info")
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so
    // initialization itself is only exercised through try_init_logging.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("hemmer_provider_twingate=debug").is_ok());
        assert!(EnvFilter::try_new("warn,hemmer_provider_twingate::client=debug").is_ok());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        try_init_logging();
        assert!(!try_init_logging());
    }
}

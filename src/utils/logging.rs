//! Structured logging setup.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the host's call, made once at startup.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber filtered by `RUST_LOG`, defaulting to
/// `info`.
pub fn init() {
    init_with_default_filter("info");
}

/// Install a formatted subscriber with an explicit fallback filter for when
/// `RUST_LOG` is unset.
pub fn init_with_default_filter(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

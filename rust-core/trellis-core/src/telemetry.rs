//! # Telemetry
//!
//! Structured JSON logging through `tracing-subscriber`.

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

/// Install a JSON subscriber filtered by `RUST_LOG`, defaulting to
/// `trellis_core=info`
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing() -> bool {
    init_tracing_with("trellis_core=info")
}

/// Same as [`init_tracing`] with a custom default directive
///
/// An unparsable directive falls back to `info`.
pub fn init_tracing_with(default_directive: &str) -> bool {
    let directive = default_directive
        .parse::<Directive>()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .json()
        .try_init()
        .is_ok()
}

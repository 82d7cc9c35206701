//! Logging initialization
//!
//! Point-of-occurrence log lines (operation failures, run lifecycle,
//! worker attachment) go through `tracing`; the final report is printed
//! separately by the output module.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` overrides the level when set; otherwise `info` by default
/// and `debug` when the debug flag is passed.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system with the default `info` filter
pub fn init() {
    init_with_filter("info");
}

/// Initialize the logging system with an explicit default filter
///
/// `RUST_LOG` still overrides the default, so operators can raise or
/// lower verbosity without touching the caller.
pub fn init_with_filter(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

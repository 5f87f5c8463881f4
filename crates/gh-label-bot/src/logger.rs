//! Logging setup
//!
//! Logs go to stderr; `RUST_LOG` overrides the default `info` filter.

use env_logger::{Builder, Env};

pub const DEFAULT_FILTER: &str = "info";

/// Initialize the global logger; later calls are ignored
pub fn init() {
    let env = Env::default().default_filter_or(DEFAULT_FILTER);
    if Builder::from_env(env).format_timestamp_millis().try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

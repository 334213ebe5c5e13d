//! Tracing subscriber for hosts that want engine logs on stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter.
pub const LOG_ENV: &str = "CYBO_LOG";

pub const DEFAULT_FILTER: &str = "cybo_engine=info,cybo_ffi=info";

/// Install a global fmt subscriber. Returns false if one was already
/// installed (by us or by the host).
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

//! Tracing subscriber setup for hosts embedding the engine.
//!
//! The engine itself only emits `tracing` events. Call [`init_logging`]
//! once from the host process (or a test harness) to print them.

use tracing_subscriber::{fmt, EnvFilter};

/// Set when JSON log lines are wanted instead of human-readable output.
pub const LOG_JSON_ENV: &str = "EDGEBOOK_LOG_JSON";

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies
/// (e.g. `"edgebook=info"`). Returns `false` if a subscriber was already
/// installed, so repeated calls are harmless.
pub fn init_logging(default_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json_logging = std::env::var(LOG_JSON_ENV).is_ok();

    let installed = if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init()
    } else {
        fmt().with_env_filter(env_filter).with_target(true).try_init()
    };

    installed.is_ok()
}

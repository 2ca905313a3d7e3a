//! # Observability
//!
//! Tracing subscriber setup for the sync binary.

use crate::config::SyncConfig;
use crate::constants::DEFAULT_LOG_TARGET;
use tracing_subscriber::EnvFilter;

/// Build the log filter: `RUST_LOG` wins, otherwise `LOG_LEVEL` for this crate
fn env_filter(config: &SyncConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}={}",
            DEFAULT_LOG_TARGET,
            config.log_level.to_lowercase()
        )
        .into()
    })
}

/// Install the global tracing subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &SyncConfig) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(false);

    let result = if config.json_logs() {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.log_enable_color).try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

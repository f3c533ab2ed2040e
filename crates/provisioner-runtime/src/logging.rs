//! Structured logging setup.
//!
//! Logs go to stderr; stdout is reserved for protocol responses.

use crate::config::RuntimeConfig;
use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// An unparseable level falls back to `info` rather than failing startup.
pub fn init_logging(config: &RuntimeConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr);

    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::debug!(
        level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

//! `sp-runtime`: serve JSON-line provisioning requests on stdin/stdout.

use anyhow::{Context, Result};
use provisioner_runtime::logging::init_logging;
use provisioner_runtime::{ProvisionerRuntime, RuntimeConfig};
use tokio::io::{stdin, stdout, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("failed to load configuration")?;
    init_logging(&config)?;

    info!("===========================================");
    info!("  Skate Provisioner v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let runtime = ProvisionerRuntime::new(&config)?;
    let sweeper = runtime.spawn_nonce_sweeper();

    let result = tokio::select! {
        served = runtime.serve(BufReader::new(stdin()), stdout()) => served,
        signal = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            signal.context("failed to listen for Ctrl-C")
        }
    };

    sweeper.abort();
    if let Err(e) = &result {
        error!(error = %e, "Runtime stopped with error");
    }
    info!("Provisioner stopped");
    result
}

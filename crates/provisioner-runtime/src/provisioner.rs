//! # CubeSigner Key Provisioner
//!
//! Mints one Secp256k1 key per wallet through the CubeSigner CLI:
//!
//! ```text
//! cs key create --type Secp256k1 --material-id EVM_{solana_pubkey}
//! ```
//!
//! The CLI prints JSON such as `{"key_id": "Key#...", "address": "0x..."}`.

use async_trait::async_trait;
use shared_types::{EvmAddress, SolanaPubkey};
use sp_01_address_mapping::{KeyProvisioner, ProvisionerError};
use tokio::process::Command;
use tracing::{debug, warn};

pub struct CubeSignerCliProvisioner {
    binary: String,
}

impl CubeSignerCliProvisioner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn material_id(pubkey: &SolanaPubkey) -> String {
        format!("EVM_{pubkey}")
    }
}

#[async_trait]
impl KeyProvisioner for CubeSignerCliProvisioner {
    async fn create_evm_key(&self, pubkey: &SolanaPubkey) -> Result<EvmAddress, ProvisionerError> {
        let material_id = Self::material_id(pubkey);
        debug!(binary = %self.binary, material_id = %material_id, "Creating EVM key");

        let output = Command::new(&self.binary)
            .args(["key", "create", "--type", "Secp256k1", "--material-id"])
            .arg(&material_id)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProvisionerError::Unavailable {
                message: format!("failed to execute {}: {e}", self.binary),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(material_id = %material_id, status = %output.status, "CubeSigner key creation failed");
            return Err(ProvisionerError::CommandFailed {
                message: stderr.trim().to_string(),
            });
        }

        parse_cli_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract and validate the `address` field of the CLI's JSON output.
pub fn parse_cli_output(stdout: &str) -> Result<EvmAddress, ProvisionerError> {
    let parsed: serde_json::Value =
        serde_json::from_str(stdout.trim()).map_err(|e| ProvisionerError::InvalidOutput {
            message: format!("not JSON: {e}"),
        })?;

    let address = parsed
        .get("address")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProvisionerError::InvalidOutput {
            message: "no address field".to_string(),
        })?;

    EvmAddress::parse(address).map_err(|e| ProvisionerError::InvalidOutput {
        message: format!("bad address {address:?}: {e}"),
    })
}

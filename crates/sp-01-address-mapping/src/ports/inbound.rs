//! # Inbound Ports (Driving Ports / API)
//!
//! The engine's public API. Every method validates its raw input first and
//! performs no store access on a validation failure.

use crate::domain::entities::{MappingSnapshot, StoreOutcome, UpdateOutcome};
use crate::domain::errors::MappingError;
use async_trait::async_trait;
use shared_types::ChainId;

/// Primary Address Mapping API.
///
/// Implementations must be thread-safe (`Send + Sync`) and must not keep
/// mutable state between calls.
#[async_trait]
pub trait AddressMappingApi: Send + Sync {
    /// Record `evm_address` as the wallet's default (first writer wins) and
    /// map each chain to the canonical default (first writer wins per chain).
    ///
    /// # Errors
    /// * `EmptyChainList`, `InvalidAddressFormat`, `InvalidPubkey`
    /// * `Store` - backing store failed (retryable when transient)
    async fn store(
        &self,
        solana_pubkey: &str,
        chain_ids: &[ChainId],
        evm_address: &str,
    ) -> Result<StoreOutcome, MappingError>;

    /// Read the default and the requested chain mappings.
    ///
    /// # Errors
    /// * `NotProvisioned` - no default mapping exists
    async fn get(
        &self,
        solana_pubkey: &str,
        chain_ids: &[ChainId],
    ) -> Result<MappingSnapshot, MappingError>;

    /// Redirect one chain to `new_evm_address`. Caller must be authorized.
    ///
    /// # Errors
    /// * `InvalidAddressFormat`
    /// * `NotProvisioned` - no default mapping exists
    async fn update(
        &self,
        solana_pubkey: &str,
        chain_id: ChainId,
        new_evm_address: &str,
    ) -> Result<UpdateOutcome, MappingError>;

    /// `store` with an address minted on demand by the key provisioner.
    /// Mints nothing when the wallet and every requested chain are already
    /// mapped, or when a default already exists.
    ///
    /// # Errors
    /// * `ProvisionerUnavailable` - no provisioner configured
    /// * everything `store` can return
    async fn provision(
        &self,
        solana_pubkey: &str,
        chain_ids: &[ChainId],
    ) -> Result<StoreOutcome, MappingError>;
}

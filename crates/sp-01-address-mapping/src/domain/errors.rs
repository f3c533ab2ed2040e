//! # Mapping Errors
//!
//! Three families:
//! - **Validation** (`EmptyChainList`, `TooManyChains`, `InvalidAddressFormat`,
//!   `InvalidPubkey`, `NotProvisioned`): deterministic, the caller must fix
//!   the input.
//! - **Infrastructure** (`Store`, `ConflictUnresolved`, `Provisioner`):
//!   surfaced as-is; the whole action may be retried.
//! - **Data** (`CorruptMapping`): a stored value is not an address.
//!
//! A lost `create_if_absent` race is *not* an error and never appears here.

use crate::ports::outbound::{KvStoreError, ProvisionerError};
use shared_types::AddressParseError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    /// `store` / `provision` called without any chain.
    #[error("chain_ids cannot be empty")]
    EmptyChainList,

    /// More chains in one request than the engine will write.
    #[error("too many chain_ids: {count} (max {max})")]
    TooManyChains { count: usize, max: usize },

    /// Address is not `0x` + 40 hex characters.
    #[error("Invalid EVM address format: {address} ({reason})")]
    InvalidAddressFormat {
        address: String,
        reason: AddressParseError,
    },

    /// Pubkey cannot be used as a key fragment.
    #[error("Invalid Solana address: {pubkey:?} ({reason})")]
    InvalidPubkey { pubkey: String, reason: String },

    /// No default mapping exists for this wallet.
    #[error("Solana address {pubkey} not provisioned")]
    NotProvisioned { pubkey: String },

    /// Backing store failed.
    #[error("KV store error: {0}")]
    Store(#[from] KvStoreError),

    /// `create_if_absent` reported an existing value that a follow-up read
    /// could not see. Only possible on a store that is not linearizable.
    #[error("write conflict at {key} but no value is readable; retry")]
    ConflictUnresolved { key: String },

    /// A stored value does not parse as an address.
    #[error("corrupt mapping at {key}: {value:?}")]
    CorruptMapping { key: String, value: String },

    /// `provision` called on an engine without a key provisioner.
    #[error("key provisioning is not configured")]
    ProvisionerUnavailable,

    /// Key provisioner failed to mint a key.
    #[error("key provisioning failed: {0}")]
    Provisioner(#[from] ProvisionerError),
}

impl MappingError {
    /// Whether retrying the whole action may succeed without changing input.
    pub fn is_retryable(&self) -> bool {
        match self {
            MappingError::Store(e) => e.is_transient(),
            MappingError::ConflictUnresolved { .. } => true,
            MappingError::Provisioner(e) => e.is_transient(),
            _ => false,
        }
    }
}

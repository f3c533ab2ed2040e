//! # Domain Entities
//!
//! Results of the three engine actions.

use shared_types::{ChainId, EvmAddress};
use std::collections::BTreeMap;

/// Result of `store` (and `provision`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOutcome {
    /// Canonical default address: the caller's candidate if it won, the
    /// previously stored value otherwise.
    pub evm_address: EvmAddress,
    /// Value now stored at each requested chain key. May differ from
    /// `evm_address` where an earlier `update` redirected the chain.
    pub chain_mappings: BTreeMap<ChainId, EvmAddress>,
    /// Whether this call's candidate became the default.
    pub default_created: bool,
}

/// Result of `get`. Absent chain mappings are reported as `None`, never
/// filled in from the default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingSnapshot {
    pub default_address: EvmAddress,
    pub chain_mappings: BTreeMap<ChainId, Option<EvmAddress>>,
}

/// Result of `update`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub new_evm_address: EvmAddress,
    pub chain_id: ChainId,
}

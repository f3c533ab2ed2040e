//! # Request Validation
//!
//! Shape checks run before any store access. Each `validate_*` turns raw
//! request fields into a typed command, so the service never touches an
//! unchecked string.
//!
//! Check order follows the action contracts: for `store` the chain list is
//! checked before the address; for `update` the address is checked before
//! the wallet is looked up.

use crate::domain::errors::MappingError;
use crate::domain::keys::MappingKeys;
use shared_types::{ChainId, EvmAddress, SolanaPubkey};

/// Upper bound on distinct chains written or read by one request.
pub const MAX_CHAINS_PER_REQUEST: usize = 1024;

/// Validated `store` input. `chain_ids` is sorted and de-duplicated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreCommand {
    pub pubkey: SolanaPubkey,
    pub chain_ids: Vec<ChainId>,
    pub candidate: EvmAddress,
}

/// Validated `get` input. `chain_ids` may be empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetQuery {
    pub pubkey: SolanaPubkey,
    pub chain_ids: Vec<ChainId>,
}

/// Validated `update` input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateCommand {
    pub pubkey: SolanaPubkey,
    pub chain_id: ChainId,
    pub new_address: EvmAddress,
}

/// Validated `provision` input (a `store` whose address is minted later).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionCommand {
    pub pubkey: SolanaPubkey,
    pub chain_ids: Vec<ChainId>,
}

pub struct RequestValidator;

impl RequestValidator {
    pub fn validate_store(
        solana_pubkey: &str,
        chain_ids: &[ChainId],
        evm_address: &str,
    ) -> Result<StoreCommand, MappingError> {
        let chain_ids = Self::non_empty_chains(chain_ids)?;
        let candidate = Self::address(evm_address)?;
        let pubkey = Self::pubkey(solana_pubkey)?;
        Ok(StoreCommand {
            pubkey,
            chain_ids,
            candidate,
        })
    }

    pub fn validate_get(
        solana_pubkey: &str,
        chain_ids: &[ChainId],
    ) -> Result<GetQuery, MappingError> {
        let chain_ids = Self::bounded_chains(chain_ids)?;
        let pubkey = Self::pubkey(solana_pubkey)?;
        Ok(GetQuery { pubkey, chain_ids })
    }

    pub fn validate_update(
        solana_pubkey: &str,
        chain_id: ChainId,
        new_evm_address: &str,
    ) -> Result<UpdateCommand, MappingError> {
        let new_address = Self::address(new_evm_address)?;
        let pubkey = Self::pubkey(solana_pubkey)?;
        Ok(UpdateCommand {
            pubkey,
            chain_id,
            new_address,
        })
    }

    pub fn validate_provision(
        solana_pubkey: &str,
        chain_ids: &[ChainId],
    ) -> Result<ProvisionCommand, MappingError> {
        let chain_ids = Self::non_empty_chains(chain_ids)?;
        let pubkey = Self::pubkey(solana_pubkey)?;
        Ok(ProvisionCommand { pubkey, chain_ids })
    }

    /// `0x` + 40 hex characters.
    pub fn address(raw: &str) -> Result<EvmAddress, MappingError> {
        EvmAddress::parse(raw).map_err(|reason| MappingError::InvalidAddressFormat {
            address: raw.to_string(),
            reason,
        })
    }

    pub fn pubkey(raw: &str) -> Result<SolanaPubkey, MappingError> {
        let pubkey = SolanaPubkey::parse(raw).map_err(|e| MappingError::InvalidPubkey {
            pubkey: raw.to_string(),
            reason: e.to_string(),
        })?;
        if MappingKeys::is_reserved(&pubkey) {
            return Err(MappingError::InvalidPubkey {
                pubkey: raw.to_string(),
                reason: "reserved key fragment".to_string(),
            });
        }
        Ok(pubkey)
    }

    fn non_empty_chains(chain_ids: &[ChainId]) -> Result<Vec<ChainId>, MappingError> {
        if chain_ids.is_empty() {
            return Err(MappingError::EmptyChainList);
        }
        Self::bounded_chains(chain_ids)
    }

    fn bounded_chains(chain_ids: &[ChainId]) -> Result<Vec<ChainId>, MappingError> {
        let mut chains = chain_ids.to_vec();
        chains.sort_unstable();
        chains.dedup();
        if chains.len() > MAX_CHAINS_PER_REQUEST {
            return Err(MappingError::TooManyChains {
                count: chains.len(),
                max: MAX_CHAINS_PER_REQUEST,
            });
        }
        Ok(chains)
    }
}

//! # Address Mapping Service
//!
//! Application service implementing `AddressMappingApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Validates every request via `RequestValidator` before touching the store
//! 2. Resolves the default mapping with `create_if_absent`, falling back to a
//!    mandatory read when another writer got there first
//! 3. Widens chain mappings one key at a time, each first-writer-wins
//! 4. Never deletes and never compensates: every intermediate state is a
//!    valid terminal state, so any action can be aborted and retried


use crate::domain::entities::{MappingSnapshot, StoreOutcome, UpdateOutcome};
use crate::domain::errors::MappingError;
use crate::domain::keys::MappingKeys;
use crate::domain::validation::{ProvisionCommand, RequestValidator, StoreCommand};
use crate::ports::inbound::AddressMappingApi;
use crate::ports::outbound::{KeyProvisioner, KeyValueStore};
use async_trait::async_trait;
use shared_types::{ChainId, EvmAddress, SolanaPubkey};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Address Mapping Service.
///
/// Stateless apart from its collaborators: many instances may share one
/// bucket, coordinated only by the store's conditional writes.
pub struct AddressMappingService<KV: KeyValueStore> {
    /// Backing store.
    store: KV,
    /// Mints addresses for `provision`; `None` disables that action.
    provisioner: Option<Arc<dyn KeyProvisioner>>,
}

impl<KV: KeyValueStore> AddressMappingService<KV> {
    /// Create a service over `store` with no key provisioner.
    pub fn new(store: KV) -> Self {
        Self {
            store,
            provisioner: None,
        }
    }

    /// Enable the `provision` action.
    pub fn with_provisioner(mut self, provisioner: Arc<dyn KeyProvisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    /// The backing store.
    pub fn kv_store(&self) -> &KV {
        &self.store
    }

    /// Steps 3-5 of `store`: resolve the default, then each chain.
    async fn execute_store(&self, cmd: StoreCommand) -> Result<StoreOutcome, MappingError> {
        let (canonical, default_created) = self.resolve_default(&cmd.pubkey, cmd.candidate).await?;

        let mut chain_mappings = BTreeMap::new();
        for chain_id in cmd.chain_ids {
            let stored = self.resolve_chain(&cmd.pubkey, chain_id, canonical).await?;
            chain_mappings.insert(chain_id, stored);
        }

        Ok(StoreOutcome {
            evm_address: canonical,
            chain_mappings,
            default_created,
        })
    }

    /// First writer wins on `default:{pubkey}`. Returns the canonical default
    /// and whether `candidate` became it.
    async fn resolve_default(
        &self,
        pubkey: &SolanaPubkey,
        candidate: EvmAddress,
    ) -> Result<(EvmAddress, bool), MappingError> {
        let key = MappingKeys::default_key(pubkey);

        if self
            .store
            .create_if_absent(&key, &candidate.to_canonical())
            .await?
        {
            info!(pubkey = %pubkey, address = %candidate, "Default mapping created");
            return Ok((candidate, true));
        }

        let winner = self.read_after_conflict(&key).await?;
        if winner != candidate {
            // The candidate's key material is now an orphan; nothing to undo.
            warn!(
                pubkey = %pubkey,
                candidate = %candidate,
                canonical = %winner,
                "Candidate lost default-mapping race, adopting stored default"
            );
        } else {
            debug!(pubkey = %pubkey, "Default mapping already present");
        }
        Ok((winner, false))
    }

    /// First writer wins on `{pubkey}:{chain_id}`. Returns the value now
    /// stored there, which may be a redirect set by `update`.
    async fn resolve_chain(
        &self,
        pubkey: &SolanaPubkey,
        chain_id: ChainId,
        canonical: EvmAddress,
    ) -> Result<EvmAddress, MappingError> {
        let key = MappingKeys::chain_key(pubkey, chain_id);

        if self
            .store
            .create_if_absent(&key, &canonical.to_canonical())
            .await?
        {
            debug!(pubkey = %pubkey, chain_id, "Chain mapping created");
            return Ok(canonical);
        }

        self.read_after_conflict(&key).await
    }

    /// Read the winner after a rejected `create_if_absent`. Mandatory: the
    /// caller must adopt the stored value, never its own candidate.
    async fn read_after_conflict(&self, key: &str) -> Result<EvmAddress, MappingError> {
        match self.read_address(key).await? {
            Some(address) => Ok(address),
            None => {
                warn!(key, "Conditional write rejected but key reads empty");
                Err(MappingError::ConflictUnresolved {
                    key: key.to_string(),
                })
            }
        }
    }

    async fn read_address(&self, key: &str) -> Result<Option<EvmAddress>, MappingError> {
        match self.store.get(key).await? {
            None => Ok(None),
            Some(value) => EvmAddress::parse(&value)
                .map(Some)
                .map_err(|_| MappingError::CorruptMapping {
                    key: key.to_string(),
                    value,
                }),
        }
    }

    /// All requested chains already mapped: answer without minting.
    async fn existing_outcome(
        &self,
        cmd: &ProvisionCommand,
        default_address: EvmAddress,
    ) -> Result<Option<StoreOutcome>, MappingError> {
        let mut chain_mappings = BTreeMap::new();
        for &chain_id in &cmd.chain_ids {
            let key = MappingKeys::chain_key(&cmd.pubkey, chain_id);
            match self.read_address(&key).await? {
                Some(address) => {
                    chain_mappings.insert(chain_id, address);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(StoreOutcome {
            evm_address: default_address,
            chain_mappings,
            default_created: false,
        }))
    }
}

#[async_trait]
impl<KV: KeyValueStore> AddressMappingApi for AddressMappingService<KV> {
    async fn store(
        &self,
        solana_pubkey: &str,
        chain_ids: &[ChainId],
        evm_address: &str,
    ) -> Result<StoreOutcome, MappingError> {
        let cmd = RequestValidator::validate_store(solana_pubkey, chain_ids, evm_address)?;
        self.execute_store(cmd)
            .await
            .inspect_err(|e| log_failure("store", solana_pubkey, e))
    }

    async fn get(
        &self,
        solana_pubkey: &str,
        chain_ids: &[ChainId],
    ) -> Result<MappingSnapshot, MappingError> {
        let query = RequestValidator::validate_get(solana_pubkey, chain_ids)?;

        let default_key = MappingKeys::default_key(&query.pubkey);
        let default_address = self
            .read_address(&default_key)
            .await
            .inspect_err(|e| log_failure("get", solana_pubkey, e))?
            .ok_or_else(|| MappingError::NotProvisioned {
                pubkey: query.pubkey.to_string(),
            })?;

        let mut chain_mappings = BTreeMap::new();
        for chain_id in query.chain_ids {
            let key = MappingKeys::chain_key(&query.pubkey, chain_id);
            let stored = self
                .read_address(&key)
                .await
                .inspect_err(|e| log_failure("get", solana_pubkey, e))?;
            chain_mappings.insert(chain_id, stored);
        }

        Ok(MappingSnapshot {
            default_address,
            chain_mappings,
        })
    }

    async fn update(
        &self,
        solana_pubkey: &str,
        chain_id: ChainId,
        new_evm_address: &str,
    ) -> Result<UpdateOutcome, MappingError> {
        let cmd = RequestValidator::validate_update(solana_pubkey, chain_id, new_evm_address)?;

        let default_key = MappingKeys::default_key(&cmd.pubkey);
        if self
            .read_address(&default_key)
            .await
            .inspect_err(|e| log_failure("update", solana_pubkey, e))?
            .is_none()
        {
            return Err(MappingError::NotProvisioned {
                pubkey: cmd.pubkey.to_string(),
            });
        }

        // Create-or-overwrite: the chain key itself need not exist yet.
        let key = MappingKeys::chain_key(&cmd.pubkey, cmd.chain_id);
        self.store
            .overwrite(&key, &cmd.new_address.to_canonical())
            .await
            .map_err(MappingError::from)
            .inspect_err(|e| log_failure("update", solana_pubkey, e))?;

        info!(
            pubkey = %cmd.pubkey,
            chain_id = cmd.chain_id,
            address = %cmd.new_address,
            "Chain mapping redirected"
        );

        Ok(UpdateOutcome {
            new_evm_address: cmd.new_address,
            chain_id: cmd.chain_id,
        })
    }

    async fn provision(
        &self,
        solana_pubkey: &str,
        chain_ids: &[ChainId],
    ) -> Result<StoreOutcome, MappingError> {
        let cmd = RequestValidator::validate_provision(solana_pubkey, chain_ids)?;
        let default_key = MappingKeys::default_key(&cmd.pubkey);

        let candidate = match self.read_address(&default_key).await? {
            Some(existing) => {
                if let Some(outcome) = self.existing_outcome(&cmd, existing).await? {
                    debug!(pubkey = %cmd.pubkey, "Provision satisfied from existing mappings");
                    return Ok(outcome);
                }
                existing
            }
            None => {
                let provisioner = self
                    .provisioner
                    .as_ref()
                    .ok_or(MappingError::ProvisionerUnavailable)?;
                let minted = provisioner
                    .create_evm_key(&cmd.pubkey)
                    .await
                    .map_err(MappingError::from)
                    .inspect_err(|e| log_failure("provision", solana_pubkey, e))?;
                info!(pubkey = %cmd.pubkey, address = %minted, "Minted candidate address");
                minted
            }
        };

        self.execute_store(StoreCommand {
            pubkey: cmd.pubkey,
            chain_ids: cmd.chain_ids,
            candidate,
        })
        .await
        .inspect_err(|e| log_failure("provision", solana_pubkey, e))
    }
}

fn log_failure(action: &'static str, pubkey: &str, error: &MappingError) {
    if error.is_retryable() {
        warn!(action, pubkey, error = %error, "Transient failure, action may be retried");
    } else {
        debug!(action, pubkey, error = %error, "Action failed");
    }
}

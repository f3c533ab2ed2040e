//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies the engine needs from its host.
//!
//! Production: `RocksDbKvStore` (feature `rocksdb`) or a remote store adapter.
//! Testing: `InMemoryKvStore`.

use async_trait::async_trait;
use shared_types::{EvmAddress, SolanaPubkey};
use std::sync::Arc;
use thiserror::Error;

/// Error from key-value store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KvStoreError {
    /// The store is temporarily unreachable. Retrying the action is safe.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The store rejected the operation for a non-transient reason.
    #[error("store backend error: {message}")]
    Backend { message: String },

    /// A stored value is not valid UTF-8.
    #[error("non-UTF-8 value at {key}")]
    InvalidValue { key: String },
}

impl KvStoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, KvStoreError::Unavailable { .. })
    }
}

/// Strongly consistent key-value store with conditional writes.
///
/// There is intentionally no delete: a key, once written, is permanent.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. No side effects.
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError>;

    /// Write `value` iff `key` holds nothing.
    ///
    /// Returns `true` if this call wrote the value, `false` if a value already
    /// existed (which is left unchanged). Must be linearizable with every
    /// other `create_if_absent` / `get` on the same key: this is the engine's
    /// only concurrency-control primitive.
    async fn create_if_absent(&self, key: &str, value: &str) -> Result<bool, KvStoreError>;

    /// Unconditional write, last writer wins.
    async fn overwrite(&self, key: &str, value: &str) -> Result<(), KvStoreError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        (**self).get(key).await
    }

    async fn create_if_absent(&self, key: &str, value: &str) -> Result<bool, KvStoreError> {
        (**self).create_if_absent(key, value).await
    }

    async fn overwrite(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        (**self).overwrite(key, value).await
    }
}

/// Error from key provisioning.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProvisionerError {
    /// Provisioner could not be reached.
    #[error("provisioner unavailable: {message}")]
    Unavailable { message: String },

    /// Provisioner ran but reported failure.
    #[error("key creation failed: {message}")]
    CommandFailed { message: String },

    /// Provisioner output could not be understood.
    #[error("invalid provisioner output: {message}")]
    InvalidOutput { message: String },
}

impl ProvisionerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProvisionerError::Unavailable { .. })
    }
}

/// Mints new Secp256k1 key material and returns its EVM address.
///
/// Not idempotent: two calls for the same wallet may mint two keys. Keys
/// that lose the default-mapping race are orphaned and never cleaned up.
#[async_trait]
pub trait KeyProvisioner: Send + Sync {
    async fn create_evm_key(&self, pubkey: &SolanaPubkey) -> Result<EvmAddress, ProvisionerError>;
}

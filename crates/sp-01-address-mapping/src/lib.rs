//! # Address Mapping Engine (sp-01)
//!
//! Maps a Solana wallet to EVM addresses: one immutable default address per
//! wallet, reused on every chain unless a chain is explicitly redirected.
//!
//! ## Key Layout
//!
//! ```text
//! default:{solana_pubkey}        -> 0x… (written once, never changed)
//! {solana_pubkey}:{chain_id}     -> 0x… (written once by store, redirected by update)
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Immutable Default | At most one default per pubkey, never overwritten |
//! | 2 | Default First | A chain mapping is only created after the default exists |
//! | 3 | Scoped Redirects | `update` touches exactly one (pubkey, chain) key |
//! | 4 | No Deletes | Keys are never removed or re-created |
//! | 5 | Convergence | Concurrent `store` calls all report the same default |
//!
//! All serialization is pushed down to the store's atomic `create_if_absent`.
//! The engine holds no shared mutable state, so any number of instances may
//! run against the same bucket.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Keys, validation, outcomes, errors
//! - `ports/` - Inbound API and outbound SPI (`KeyValueStore`, `KeyProvisioner`)
//! - `service/` - `AddressMappingService`, the engine itself
//! - `adapters/` - In-memory, bucket-prefixed and RocksDB stores
//! - `ipc/` - JSON action protocol (`store` / `get` / `update` / `provision`)
//!
//! ## Usage
//!
//! ```ignore
//! use sp_01_address_mapping::{AddressMappingApi, AddressMappingService, InMemoryKvStore};
//!
//! let service = AddressMappingService::new(InMemoryKvStore::new());
//! let outcome = service.store("TestUser123", &[1, 137], "0xcb37…").await?;
//! let snapshot = service.get("TestUser123", &[1, 137]).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;

/// Fault-injecting stores and deterministic provisioners.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::{BucketedStore, InMemoryKvStore};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbKvStore};
pub use domain::entities::{MappingSnapshot, StoreOutcome, UpdateOutcome};
pub use domain::errors::MappingError;
pub use domain::keys::MappingKeys;
pub use domain::validation::{RequestValidator, MAX_CHAINS_PER_REQUEST};
pub use ports::inbound::AddressMappingApi;
pub use ports::outbound::{KeyProvisioner, KeyValueStore, KvStoreError, ProvisionerError};
pub use service::AddressMappingService;

// Re-export IPC types
pub use ipc::{ActionRequest, ActionResponse, MappingRequestHandler};

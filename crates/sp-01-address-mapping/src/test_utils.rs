//! Test doubles for the outbound ports.
//!
//! - `FaultyKvStore`: in-memory store with switchable failures
//! - `RacingKvStore`: a rival writer always lands first
//! - `PhantomConflictStore`: rejects writes but never shows a value
//! - `SequentialKeyProvisioner` / `FailingKeyProvisioner`

use crate::adapters::InMemoryKvStore;
use crate::ports::outbound::{KeyProvisioner, KeyValueStore, KvStoreError, ProvisionerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{EvmAddress, SolanaPubkey};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

pub const TEST_PUBKEY: &str = "TestUser123";
pub const OTHER_PUBKEY: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

/// Deterministic address: `n` big-endian in the low bytes.
pub fn test_address(n: u64) -> EvmAddress {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    EvmAddress::from_bytes(bytes)
}

/// Canonical string form of [`test_address`].
pub fn test_address_str(n: u64) -> String {
    test_address(n).to_canonical()
}

fn unavailable(op: &str) -> KvStoreError {
    KvStoreError::Unavailable {
        message: format!("injected {op} failure"),
    }
}

// =============================================================================
// FAULTY STORE
// =============================================================================

/// In-memory store whose operations can be made to fail with
/// `KvStoreError::Unavailable`.
#[derive(Default)]
pub struct FaultyKvStore {
    inner: InMemoryKvStore,
    fail_gets: AtomicBool,
    fail_overwrites: AtomicBool,
    /// `create_if_absent` calls allowed before failing; `usize::MAX` = never fail.
    creates_allowed: AtomicUsize,
    creates_seen: AtomicUsize,
}

impl FaultyKvStore {
    pub fn new() -> Self {
        Self {
            creates_allowed: AtomicUsize::new(usize::MAX),
            ..Self::default()
        }
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_overwrites(&self, fail: bool) {
        self.fail_overwrites.store(fail, Ordering::SeqCst);
    }

    /// Let the next `n` `create_if_absent` calls through, fail the rest.
    pub fn fail_creates_after(&self, n: usize) {
        self.creates_seen.store(0, Ordering::SeqCst);
        self.creates_allowed.store(n, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.fail_gets(false);
        self.fail_overwrites(false);
        self.creates_allowed.store(usize::MAX, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl KeyValueStore for FaultyKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(unavailable("get"));
        }
        self.inner.get(key).await
    }

    async fn create_if_absent(&self, key: &str, value: &str) -> Result<bool, KvStoreError> {
        let seen = self.creates_seen.fetch_add(1, Ordering::SeqCst);
        if seen >= self.creates_allowed.load(Ordering::SeqCst) {
            return Err(unavailable("create_if_absent"));
        }
        self.inner.create_if_absent(key, value).await
    }

    async fn overwrite(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        if self.fail_overwrites.load(Ordering::SeqCst) {
            return Err(unavailable("overwrite"));
        }
        self.inner.overwrite(key, value).await
    }
}

// =============================================================================
// RACING STORE
// =============================================================================

/// Every `create_if_absent` loses: a rival value is written to the key just
/// before the caller's attempt, unless the key already holds something.
pub struct RacingKvStore {
    inner: InMemoryKvStore,
    rival: String,
}

impl RacingKvStore {
    pub fn new(rival: EvmAddress) -> Self {
        Self {
            inner: InMemoryKvStore::new(),
            rival: rival.to_canonical(),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl KeyValueStore for RacingKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        self.inner.get(key).await
    }

    async fn create_if_absent(&self, key: &str, value: &str) -> Result<bool, KvStoreError> {
        self.inner.create_if_absent(key, &self.rival).await?;
        self.inner.create_if_absent(key, value).await
    }

    async fn overwrite(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        self.inner.overwrite(key, value).await
    }
}

// =============================================================================
// PHANTOM CONFLICT STORE
// =============================================================================

/// Non-linearizable store: every conditional write reports a conflict, yet
/// every read comes back empty.
#[derive(Default)]
pub struct PhantomConflictStore;

#[async_trait]
impl KeyValueStore for PhantomConflictStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, KvStoreError> {
        Ok(None)
    }

    async fn create_if_absent(&self, _key: &str, _value: &str) -> Result<bool, KvStoreError> {
        Ok(false)
    }

    async fn overwrite(&self, _key: &str, _value: &str) -> Result<(), KvStoreError> {
        Ok(())
    }
}

// =============================================================================
// PROVISIONERS
// =============================================================================

/// Mints `test_address(1)`, `test_address(2)`, ... in call order.
#[derive(Default)]
pub struct SequentialKeyProvisioner {
    next: AtomicU64,
    minted: Mutex<Vec<(SolanaPubkey, EvmAddress)>>,
}

impl SequentialKeyProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering after `offset`, so several provisioners never collide.
    pub fn starting_at(offset: u64) -> Self {
        Self {
            next: AtomicU64::new(offset),
            minted: Mutex::new(Vec::new()),
        }
    }

    pub fn minted_count(&self) -> usize {
        self.minted.lock().len()
    }

    pub fn minted(&self) -> Vec<(SolanaPubkey, EvmAddress)> {
        self.minted.lock().clone()
    }
}

#[async_trait]
impl KeyProvisioner for SequentialKeyProvisioner {
    async fn create_evm_key(&self, pubkey: &SolanaPubkey) -> Result<EvmAddress, ProvisionerError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let address = test_address(n);
        self.minted.lock().push((pubkey.clone(), address));
        Ok(address)
    }
}

/// Always fails with the configured error.
pub struct FailingKeyProvisioner(pub ProvisionerError);

#[async_trait]
impl KeyProvisioner for FailingKeyProvisioner {
    async fn create_evm_key(&self, _pubkey: &SolanaPubkey) -> Result<EvmAddress, ProvisionerError> {
        Err(self.0.clone())
    }
}

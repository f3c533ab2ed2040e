//! # Nonce Store
//!
//! Single-use, TTL-bounded challenge tokens.
//!
//! Lifecycle: created empty, `issue` inserts with an expiry, `consume`
//! removes on first successful use, `sweep_expired` drops stale entries.
//! The store is bounded; at capacity an insert first sweeps, then refuses.

use crate::domain::errors::AuthError;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use shared_types::SolanaPubkey;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default nonce lifetime (seconds).
pub const DEFAULT_NONCE_TTL_SECS: u64 = 300;

/// Maximum unexpired nonces held at once.
pub const MAX_OUTSTANDING_NONCES: usize = 100_000;

// =============================================================================
// CLOCK
// =============================================================================

/// Source of Unix time in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<u64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, secs: u64) {
        *self.now.lock() += secs;
    }

    pub fn set(&self, secs: u64) {
        *self.now.lock() = secs;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        *self.now.lock()
    }
}

// =============================================================================
// NONCE STORE
// =============================================================================

/// A nonce handed to a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedNonce {
    pub nonce: Uuid,
    pub solana_pubkey: SolanaPubkey,
    /// Unix seconds; the nonce is rejected at or after this instant.
    pub expires_at: u64,
}

#[derive(Debug)]
struct NonceEntry {
    owner: SolanaPubkey,
    expires_at: u64,
}

pub struct NonceStore {
    entries: RwLock<HashMap<Uuid, NonceEntry>>,
    ttl_secs: u64,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl NonceStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self::with_clock(ttl_secs, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_secs,
            capacity: MAX_OUTSTANDING_NONCES,
            clock,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Issue a fresh nonce bound to `pubkey`.
    pub fn issue(&self, pubkey: &SolanaPubkey) -> Result<IssuedNonce, AuthError> {
        let now = self.clock.now();
        let mut entries = self.entries.write();

        if entries.len() >= self.capacity {
            let before = entries.len();
            entries.retain(|_, e| e.expires_at > now);
            debug!(swept = before - entries.len(), "Swept expired nonces at capacity");
            if entries.len() >= self.capacity {
                warn!(capacity = self.capacity, "Nonce store full");
                return Err(AuthError::NonceCapacityExceeded { max: self.capacity });
            }
        }

        let nonce = Uuid::new_v4();
        let expires_at = now.saturating_add(self.ttl_secs);
        entries.insert(
            nonce,
            NonceEntry {
                owner: pubkey.clone(),
                expires_at,
            },
        );

        Ok(IssuedNonce {
            nonce,
            solana_pubkey: pubkey.clone(),
            expires_at,
        })
    }

    /// Use `nonce` for `pubkey`. Succeeds at most once per issued nonce.
    ///
    /// A nonce presented by the wrong wallet is left in place, so a third
    /// party cannot burn it.
    pub fn consume(&self, pubkey: &SolanaPubkey, nonce: &Uuid) -> Result<(), AuthError> {
        let now = self.clock.now();
        let mut entries = self.entries.write();

        let entry = entries.get(nonce).ok_or(AuthError::UnknownNonce)?;
        if entry.owner != *pubkey {
            return Err(AuthError::NonceOwnerMismatch);
        }
        let expired = now >= entry.expires_at;
        entries.remove(nonce);
        if expired {
            return Err(AuthError::NonceExpired);
        }
        Ok(())
    }

    /// Drop every expired nonce. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

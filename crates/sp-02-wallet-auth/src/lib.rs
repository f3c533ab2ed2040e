//! # Wallet Authentication (sp-02)
//!
//! Proves that a request comes from the holder of a Solana wallet.
//!
//! ## Flow
//!
//! ```text
//! client                         provisioner
//!   │── nonce(pubkey) ─────────────►│ issue UUIDv4, expiry = now + ttl
//!   │◄──────────────── nonce ───────│
//!   │  sign "skate-provisioner:{nonce}" with the wallet key
//!   │── action + {signer, nonce, signature} ──►│ verify, then consume nonce
//! ```
//!
//! ## Security Properties
//!
//! - **Single use**: a nonce is consumed by its first successful verification
//! - **Time-bounded**: nonces expire after the configured TTL
//! - **Owner-bound**: a nonce only authenticates the wallet it was issued to
//! - **No nonce burning**: a bad signature leaves the nonce untouched

pub mod domain;
pub mod service;

pub use domain::errors::AuthError;
pub use domain::nonce::{
    Clock, IssuedNonce, ManualClock, NonceStore, SystemClock, DEFAULT_NONCE_TTL_SECS,
    MAX_OUTSTANDING_NONCES,
};
pub use domain::signature::{challenge_message, verify_wallet_signature, CHALLENGE_PREFIX};
pub use service::{AuthProof, WalletAuthenticator};

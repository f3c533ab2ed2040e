//! # Shared Types Crate
//!
//! Identity and address types used across the provisioner crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the key-fragment shape of a Solana pubkey and
//!   the canonical text form of an EVM address are defined once, here.
//! - **Parse, don't re-check**: once a value has been turned into a
//!   `SolanaPubkey` or `EvmAddress` it is known to be well-formed.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;

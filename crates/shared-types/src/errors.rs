//! # Error Types
//!
//! Parse errors for the shared identity and address types.

use thiserror::Error;

/// Errors produced when parsing a `SolanaPubkey` or an `EvmAddress`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Address does not start with the `0x` prefix.
    #[error("missing 0x prefix")]
    MissingPrefix,

    /// Address body has the wrong number of hex characters.
    #[error("expected {expected} hex characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// Address body contains a non-hex character.
    #[error("non-hex character in address")]
    NonHex,

    /// Pubkey is the empty string.
    #[error("pubkey is empty")]
    EmptyPubkey,

    /// Pubkey is longer than any Base58 encoding of 32 bytes.
    #[error("pubkey too long: {len} characters (max {max})")]
    PubkeyTooLong { len: usize, max: usize },

    /// Pubkey contains a character outside the alphanumeric set.
    #[error("pubkey contains invalid character {0:?}")]
    PubkeyCharset(char),
}

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Not a Base58-encoded Ed25519 public key.
    #[error("Invalid Solana public key: {pubkey}")]
    InvalidPubkey { pubkey: String },

    /// Signature is not Base58 or not 64 bytes.
    #[error("Invalid signature encoding")]
    InvalidSignatureEncoding,

    #[error("Signature verification failed")]
    BadSignature,

    /// Never issued, or already consumed.
    #[error("Unknown or already used nonce")]
    UnknownNonce,

    #[error("Nonce expired")]
    NonceExpired,

    /// Issued to a different wallet.
    #[error("Nonce was not issued to this wallet")]
    NonceOwnerMismatch,

    /// Too many unexpired nonces outstanding.
    #[error("Too many outstanding nonces (max {max})")]
    NonceCapacityExceeded { max: usize },
}

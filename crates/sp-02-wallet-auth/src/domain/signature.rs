//! # Ed25519 Wallet Signatures
//!
//! Solana wallets sign with Ed25519; keys and signatures travel Base58.
//! Verification is strict (rejects small-order keys and malleable
//! signatures).

use crate::domain::errors::AuthError;
use ed25519_dalek::{Signature, VerifyingKey};
use uuid::Uuid;

pub const CHALLENGE_PREFIX: &str = "skate-provisioner:";

/// The message a wallet signs to prove possession for `nonce`.
pub fn challenge_message(nonce: &Uuid) -> String {
    format!("{CHALLENGE_PREFIX}{nonce}")
}

/// Verify `signature_b58` over `message` by the wallet `pubkey_b58`.
pub fn verify_wallet_signature(
    pubkey_b58: &str,
    message: &[u8],
    signature_b58: &str,
) -> Result<(), AuthError> {
    let invalid_pubkey = || AuthError::InvalidPubkey {
        pubkey: pubkey_b58.to_string(),
    };

    let key_bytes: [u8; 32] = bs58::decode(pubkey_b58)
        .into_vec()
        .map_err(|_| invalid_pubkey())?
        .try_into()
        .map_err(|_| invalid_pubkey())?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| invalid_pubkey())?;

    let sig_bytes: [u8; 64] = bs58::decode(signature_b58)
        .into_vec()
        .map_err(|_| AuthError::InvalidSignatureEncoding)?
        .try_into()
        .map_err(|_| AuthError::InvalidSignatureEncoding)?;
    let signature = Signature::from_bytes(&sig_bytes);

    verifying_key
        .verify_strict(message, &signature)
        .map_err(|_| AuthError::BadSignature)
}

//! # Wallet Authenticator
//!
//! Verifies an `AuthProof` against the nonce store.

use crate::domain::errors::AuthError;
use crate::domain::nonce::{IssuedNonce, NonceStore};
use crate::domain::signature::{challenge_message, verify_wallet_signature};
use serde::{Deserialize, Serialize};
use shared_types::SolanaPubkey;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Proof of wallet possession carried with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProof {
    /// Base58 wallet public key.
    pub signer: String,
    pub nonce: Uuid,
    /// Base58 Ed25519 signature over `challenge_message(nonce)`.
    pub signature: String,
}

#[derive(Clone)]
pub struct WalletAuthenticator {
    nonces: Arc<NonceStore>,
}

impl WalletAuthenticator {
    pub fn new(nonces: Arc<NonceStore>) -> Self {
        Self { nonces }
    }

    pub fn nonces(&self) -> &NonceStore {
        &self.nonces
    }

    pub fn issue_nonce(&self, solana_pubkey: &str) -> Result<IssuedNonce, AuthError> {
        let pubkey = parse_pubkey(solana_pubkey)?;
        let issued = self.nonces.issue(&pubkey)?;
        debug!(pubkey = %pubkey, expires_at = issued.expires_at, "Issued nonce");
        Ok(issued)
    }

    /// Returns the authenticated wallet.
    ///
    /// The signature is checked before the nonce is touched, so a forged
    /// proof never consumes a legitimate nonce.
    pub fn authenticate(&self, proof: &AuthProof) -> Result<SolanaPubkey, AuthError> {
        let signer = parse_pubkey(&proof.signer)?;
        let message = challenge_message(&proof.nonce);

        verify_wallet_signature(&proof.signer, message.as_bytes(), &proof.signature)
            .inspect_err(|e| warn!(signer = %signer, error = %e, "Rejected wallet signature"))?;
        self.nonces
            .consume(&signer, &proof.nonce)
            .inspect_err(|e| warn!(signer = %signer, error = %e, "Rejected nonce"))?;

        debug!(signer = %signer, "Wallet authenticated");
        Ok(signer)
    }
}

fn parse_pubkey(raw: &str) -> Result<SolanaPubkey, AuthError> {
    SolanaPubkey::parse(raw).map_err(|_| AuthError::InvalidPubkey {
        pubkey: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::nonce::ManualClock;
    use ed25519_dalek::{Signer, SigningKey};

    struct Wallet {
        key: SigningKey,
        pubkey: String,
    }

    impl Wallet {
        fn new(seed: u8) -> Self {
            let key = SigningKey::from_bytes(&[seed; 32]);
            let pubkey = bs58::encode(key.verifying_key().to_bytes()).into_string();
            Self { key, pubkey }
        }

        fn prove(&self, nonce: Uuid) -> AuthProof {
            let sig = self.key.sign(challenge_message(&nonce).as_bytes());
            AuthProof {
                signer: self.pubkey.clone(),
                nonce,
                signature: bs58::encode(sig.to_bytes()).into_string(),
            }
        }
    }

    fn authenticator() -> (Arc<ManualClock>, WalletAuthenticator) {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = NonceStore::with_clock(60, clock.clone());
        (clock, WalletAuthenticator::new(Arc::new(store)))
    }

    #[test]
    fn test_authenticate_happy_path() {
        let (_clock, auth) = authenticator();
        let wallet = Wallet::new(1);

        let issued = auth.issue_nonce(&wallet.pubkey).unwrap();
        let signer = auth.authenticate(&wallet.prove(issued.nonce)).unwrap();

        assert_eq!(signer.as_str(), wallet.pubkey);
    }

    #[test]
    fn test_replay_rejected() {
        let (_clock, auth) = authenticator();
        let wallet = Wallet::new(1);
        let proof = wallet.prove(auth.issue_nonce(&wallet.pubkey).unwrap().nonce);

        auth.authenticate(&proof).unwrap();

        assert_eq!(auth.authenticate(&proof), Err(AuthError::UnknownNonce));
    }

    #[test]
    fn test_forged_signature_keeps_nonce() {
        let (_clock, auth) = authenticator();
        let victim = Wallet::new(1);
        let attacker = Wallet::new(2);
        let issued = auth.issue_nonce(&victim.pubkey).unwrap();

        let mut forged = attacker.prove(issued.nonce);
        forged.signer = victim.pubkey.clone();
        assert_eq!(auth.authenticate(&forged), Err(AuthError::BadSignature));

        assert!(auth.authenticate(&victim.prove(issued.nonce)).is_ok());
    }

    #[test]
    fn test_nonce_bound_to_issuing_wallet() {
        let (_clock, auth) = authenticator();
        let alice = Wallet::new(1);
        let bob = Wallet::new(2);
        let issued = auth.issue_nonce(&alice.pubkey).unwrap();

        assert_eq!(
            auth.authenticate(&bob.prove(issued.nonce)),
            Err(AuthError::NonceOwnerMismatch)
        );
    }

    #[test]
    fn test_expired_nonce() {
        let (clock, auth) = authenticator();
        let wallet = Wallet::new(1);
        let issued = auth.issue_nonce(&wallet.pubkey).unwrap();

        clock.advance(61);

        assert_eq!(
            auth.authenticate(&wallet.prove(issued.nonce)),
            Err(AuthError::NonceExpired)
        );
    }

    #[test]
    fn test_unissued_nonce() {
        let (_clock, auth) = authenticator();
        let wallet = Wallet::new(1);

        assert_eq!(
            auth.authenticate(&wallet.prove(Uuid::new_v4())),
            Err(AuthError::UnknownNonce)
        );
    }

    #[test]
    fn test_issue_rejects_malformed_pubkey() {
        let (_clock, auth) = authenticator();
        assert!(matches!(
            auth.issue_nonce("not:a:key"),
            Err(AuthError::InvalidPubkey { .. })
        ));
    }
}

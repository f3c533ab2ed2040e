//! # Request Gateway
//!
//! Front door for JSON-line requests. Issues nonces, enforces the access
//! policy, then hands the action to the engine's `MappingRequestHandler`.
//!
//! ## Access Policy
//!
//! | Action | `require_auth` on |
//! |--------|-------------------|
//! | `nonce` | open |
//! | `store` / `get` / `provision` | signer must be `solana_pubkey` |
//! | `update` | signer must be an admin |
//!
//! With `require_auth` off, a proof is optional, but a proof that is present
//! must still verify.

use serde::{Deserialize, Serialize};
use shared_types::SolanaPubkey;
use sp_01_address_mapping::{ActionRequest, ActionResponse, MappingRequestHandler};
use sp_02_wallet_auth::{challenge_message, AuthError, AuthProof, IssuedNonce, WalletAuthenticator};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Signer {signer} may not act for {pubkey}")]
    SignerMismatch { signer: String, pubkey: String },

    #[error("Signer {signer} is not authorized to update mappings")]
    NotAdmin { signer: String },
}

/// Who may do what.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    pub require_auth: bool,
    pub admin_pubkeys: BTreeSet<String>,
}

/// An engine action plus an optional proof of wallet possession.
#[derive(Debug, Clone, Deserialize)]
struct AuthenticatedRequest {
    #[serde(flatten)]
    request: ActionRequest,
    #[serde(default)]
    auth: Option<AuthProof>,
}

#[derive(Debug, Clone, Deserialize)]
struct NonceRequest {
    solana_pubkey: String,
}

/// Response to the `nonce` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceResponse {
    pub success: bool,
    pub nonce: Uuid,
    pub solana_pubkey: String,
    pub expires_at: u64,
    /// The exact message to sign.
    pub message: String,
}

impl From<IssuedNonce> for NonceResponse {
    fn from(issued: IssuedNonce) -> Self {
        Self {
            success: true,
            message: challenge_message(&issued.nonce),
            nonce: issued.nonce,
            solana_pubkey: issued.solana_pubkey.to_string(),
            expires_at: issued.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GatewayResponse {
    Nonce(NonceResponse),
    Action(ActionResponse),
}

impl GatewayResponse {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| sp_01_address_mapping::ipc::SERIALIZATION_FAILURE_JSON.to_string())
    }

    pub fn is_success(&self) -> bool {
        match self {
            GatewayResponse::Nonce(_) => true,
            GatewayResponse::Action(response) => response.is_success(),
        }
    }
}

impl From<GatewayError> for GatewayResponse {
    fn from(error: GatewayError) -> Self {
        GatewayResponse::Action(ActionResponse::error(error.to_string()))
    }
}

pub struct Gateway {
    handler: MappingRequestHandler,
    authenticator: WalletAuthenticator,
    policy: AccessPolicy,
}

impl Gateway {
    pub fn new(
        handler: MappingRequestHandler,
        authenticator: WalletAuthenticator,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            handler,
            authenticator,
            policy,
        }
    }

    pub fn authenticator(&self) -> &WalletAuthenticator {
        &self.authenticator
    }

    /// Handle one JSON request line, producing one JSON response line.
    pub async fn handle_line(&self, line: &str) -> String {
        self.handle(line).await.to_json()
    }

    pub async fn handle(&self, line: &str) -> GatewayResponse {
        match self.dispatch(line).await {
            Ok(response) => response,
            Err(error) => {
                debug!(error = %error, "Request rejected at gateway");
                error.into()
            }
        }
    }

    async fn dispatch(&self, line: &str) -> Result<GatewayResponse, GatewayError> {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        if value.get("action").and_then(|a| a.as_str()) == Some("nonce") {
            let request: NonceRequest = serde_json::from_value(value)
                .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
            let issued = self.authenticator.issue_nonce(&request.solana_pubkey)?;
            return Ok(GatewayResponse::Nonce(issued.into()));
        }

        let AuthenticatedRequest { request, auth } = serde_json::from_value(value)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        self.authorize(&request, auth.as_ref())?;

        Ok(GatewayResponse::Action(self.handler.handle(request).await))
    }

    fn authorize(
        &self,
        request: &ActionRequest,
        proof: Option<&AuthProof>,
    ) -> Result<(), GatewayError> {
        let signer = match proof {
            Some(proof) => Some(self.authenticator.authenticate(proof)?),
            None => None,
        };

        if !self.policy.require_auth {
            return Ok(());
        }
        let signer = signer.ok_or(GatewayError::Unauthenticated)?;

        match request {
            ActionRequest::Update { .. } => self.require_admin(&signer),
            _ => self.require_owner(&signer, request.solana_pubkey()),
        }
    }

    fn require_owner(&self, signer: &SolanaPubkey, pubkey: &str) -> Result<(), GatewayError> {
        if signer.as_str() == pubkey {
            return Ok(());
        }
        warn!(signer = %signer, pubkey, "Signer does not own target wallet");
        Err(GatewayError::SignerMismatch {
            signer: signer.to_string(),
            pubkey: pubkey.to_string(),
        })
    }

    fn require_admin(&self, signer: &SolanaPubkey) -> Result<(), GatewayError> {
        if self.policy.admin_pubkeys.contains(signer.as_str()) {
            return Ok(());
        }
        warn!(signer = %signer, "Non-admin attempted update");
        Err(GatewayError::NotAdmin {
            signer: signer.to_string(),
        })
    }
}

//! IPC payload definitions.
//!
//! Requests are tagged by `action`. Every response carries `success`; error
//! responses carry a human-readable `error` and, when retrying may succeed,
//! `retryable: true`.

use crate::domain::entities::{MappingSnapshot, StoreOutcome, UpdateOutcome};
use crate::domain::errors::MappingError;
use serde::{Deserialize, Serialize};
use shared_types::{ChainId, EvmAddress};
use std::collections::BTreeMap;

/// Emitted if a response itself cannot be serialized.
pub const SERIALIZATION_FAILURE_JSON: &str =
    r#"{"success":false,"error":"Failed to serialize response"}"#;

// ============================================================
// REQUEST PAYLOADS
// ============================================================

/// Engine actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    /// Record a caller-minted address as default and map chains to it.
    Store {
        solana_pubkey: String,
        chain_ids: Vec<ChainId>,
        evm_address: String,
    },
    /// Read the default and the requested chain mappings.
    Get {
        solana_pubkey: String,
        #[serde(default)]
        chain_ids: Vec<ChainId>,
    },
    /// Redirect one chain (privileged).
    Update {
        solana_pubkey: String,
        chain_id: ChainId,
        new_evm_address: String,
    },
    /// `store` with an address minted by the key provisioner.
    Provision {
        solana_pubkey: String,
        chain_ids: Vec<ChainId>,
    },
}

impl ActionRequest {
    pub fn action_name(&self) -> &'static str {
        match self {
            ActionRequest::Store { .. } => "store",
            ActionRequest::Get { .. } => "get",
            ActionRequest::Update { .. } => "update",
            ActionRequest::Provision { .. } => "provision",
        }
    }

    pub fn solana_pubkey(&self) -> &str {
        match self {
            ActionRequest::Store { solana_pubkey, .. }
            | ActionRequest::Get { solana_pubkey, .. }
            | ActionRequest::Update { solana_pubkey, .. }
            | ActionRequest::Provision { solana_pubkey, .. } => solana_pubkey,
        }
    }

    /// Whether the action writes.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ActionRequest::Get { .. })
    }
}

// ============================================================
// RESPONSE PAYLOADS
// ============================================================

/// Success response of `store` and `provision`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResponse {
    pub success: bool,
    pub evm_address: EvmAddress,
    pub chain_mappings: BTreeMap<ChainId, EvmAddress>,
}

impl From<StoreOutcome> for StoreResponse {
    fn from(outcome: StoreOutcome) -> Self {
        Self {
            success: true,
            evm_address: outcome.evm_address,
            chain_mappings: outcome.chain_mappings,
        }
    }
}

/// Success response of `get`. Unmapped chains serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    pub success: bool,
    pub default_address: EvmAddress,
    pub chain_mappings: BTreeMap<ChainId, Option<EvmAddress>>,
}

impl From<MappingSnapshot> for GetResponse {
    fn from(snapshot: MappingSnapshot) -> Self {
        Self {
            success: true,
            default_address: snapshot.default_address,
            chain_mappings: snapshot.chain_mappings,
        }
    }
}

/// Success response of `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub new_evm_address: EvmAddress,
    pub chain_id: ChainId,
}

impl From<UpdateOutcome> for UpdateResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            success: true,
            new_evm_address: outcome.new_evm_address,
            chain_id: outcome.chain_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            retryable: false,
        }
    }
}

impl From<&MappingError> for ErrorResponse {
    fn from(error: &MappingError) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// Any engine response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionResponse {
    Store(StoreResponse),
    Get(GetResponse),
    Update(UpdateResponse),
    Error(ErrorResponse),
}

impl ActionResponse {
    pub fn error(message: impl Into<String>) -> Self {
        ActionResponse::Error(ErrorResponse::new(message))
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ActionResponse::Error(_))
    }

    /// Serialize to a single JSON line. Never fails.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| SERIALIZATION_FAILURE_JSON.to_string())
    }
}

impl From<MappingError> for ActionResponse {
    fn from(error: MappingError) -> Self {
        ActionResponse::Error(ErrorResponse::from(&error))
    }
}

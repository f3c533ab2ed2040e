//! Dispatches decoded requests to the engine and shapes responses.

use super::payloads::*;
use crate::ports::inbound::AddressMappingApi;
use std::sync::Arc;
use tracing::debug;

/// Mapping IPC Handler.
///
/// Transport-agnostic: callers hand it a request (or a raw JSON line) and
/// get a response back. Errors never escape as `Err`; every failure is an
/// `ErrorResponse`.
#[derive(Clone)]
pub struct MappingRequestHandler {
    api: Arc<dyn AddressMappingApi>,
}

impl MappingRequestHandler {
    pub fn new(api: Arc<dyn AddressMappingApi>) -> Self {
        Self { api }
    }

    pub async fn handle(&self, request: ActionRequest) -> ActionResponse {
        debug!(action = request.action_name(), pubkey = request.solana_pubkey(), "Handling request");

        match request {
            ActionRequest::Store {
                solana_pubkey,
                chain_ids,
                evm_address,
            } => match self.api.store(&solana_pubkey, &chain_ids, &evm_address).await {
                Ok(outcome) => ActionResponse::Store(outcome.into()),
                Err(e) => e.into(),
            },
            ActionRequest::Get {
                solana_pubkey,
                chain_ids,
            } => match self.api.get(&solana_pubkey, &chain_ids).await {
                Ok(snapshot) => ActionResponse::Get(snapshot.into()),
                Err(e) => e.into(),
            },
            ActionRequest::Update {
                solana_pubkey,
                chain_id,
                new_evm_address,
            } => match self
                .api
                .update(&solana_pubkey, chain_id, &new_evm_address)
                .await
            {
                Ok(outcome) => ActionResponse::Update(outcome.into()),
                Err(e) => e.into(),
            },
            ActionRequest::Provision {
                solana_pubkey,
                chain_ids,
            } => match self.api.provision(&solana_pubkey, &chain_ids).await {
                Ok(outcome) => ActionResponse::Store(outcome.into()),
                Err(e) => e.into(),
            },
        }
    }

    /// Decode one JSON request, handle it, encode the response.
    pub async fn handle_json(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<ActionRequest>(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => ActionResponse::error(format!("Invalid request: {e}")),
        };
        response.to_json()
    }
}

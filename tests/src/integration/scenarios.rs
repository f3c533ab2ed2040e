//! # Request/Response Scenarios
//!
//! The documented action examples, driven through the JSON handler over a
//! bucketed in-memory store.

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use sp_01_address_mapping::{
        AddressMappingService, BucketedStore, InMemoryKvStore, MappingRequestHandler,
    };
    use std::sync::Arc;

    const USER: &str = "TestUser123";
    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
    const CANONICAL: &str = "0xcb37000000000000000000000000000000000aee";
    const OTHER: &str = "0x1111111111111111111111111111111111111111";
    const REDIRECT: &str = "0xb29d000000000000000000000000000000000424";

    fn handler() -> MappingRequestHandler {
        let store = BucketedStore::new(InMemoryKvStore::new(), "solana_to_evm");
        MappingRequestHandler::new(Arc::new(AddressMappingService::new(store)))
    }

    async fn call(handler: &MappingRequestHandler, request: Value) -> Value {
        serde_json::from_str(&handler.handle_json(&request.to_string()).await).unwrap()
    }

    fn store(pubkey: &str, address: &str) -> Value {
        json!({
            "action": "store",
            "solana_pubkey": pubkey,
            "chain_ids": [1, 137, 42161],
            "evm_address": address,
        })
    }

    fn all_chains(address: &str) -> Value {
        json!({"1": address, "137": address, "42161": address})
    }

    #[tokio::test]
    async fn first_store_maps_all_chains() {
        let handler = handler();

        let response = call(&handler, store(USER, CANONICAL)).await;

        assert_eq!(
            response,
            json!({"success": true, "evm_address": CANONICAL, "chain_mappings": all_chains(CANONICAL)})
        );
    }

    #[tokio::test]
    async fn repeat_store_keeps_first_address() {
        let handler = handler();
        let first = call(&handler, store(USER, CANONICAL)).await;

        let second = call(&handler, store(USER, OTHER)).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn get_returns_stored_mappings() {
        let handler = handler();
        call(&handler, store(USER, CANONICAL)).await;

        let response = call(
            &handler,
            json!({"action": "get", "solana_pubkey": USER, "chain_ids": [1, 137, 42161]}),
        )
        .await;

        assert_eq!(
            response,
            json!({"success": true, "default_address": CANONICAL, "chain_mappings": all_chains(CANONICAL)})
        );
    }

    #[tokio::test]
    async fn update_redirects_only_one_chain() {
        let handler = handler();
        call(&handler, store(WALLET, CANONICAL)).await;

        let response = call(
            &handler,
            json!({"action": "update", "solana_pubkey": WALLET, "chain_id": 137, "new_evm_address": REDIRECT}),
        )
        .await;
        assert_eq!(
            response,
            json!({"success": true, "new_evm_address": REDIRECT, "chain_id": 137})
        );

        let after = call(
            &handler,
            json!({"action": "get", "solana_pubkey": WALLET, "chain_ids": [1, 137, 42161]}),
        )
        .await;
        assert_eq!(
            after["chain_mappings"],
            json!({"1": CANONICAL, "137": REDIRECT, "42161": CANONICAL})
        );
        assert_eq!(after["default_address"], json!(CANONICAL));
    }

    #[tokio::test]
    async fn update_unknown_wallet_not_provisioned() {
        let handler = handler();

        let response = call(
            &handler,
            json!({"action": "update", "solana_pubkey": WALLET, "chain_id": 137, "new_evm_address": REDIRECT}),
        )
        .await;

        assert_eq!(
            response,
            json!({"success": false, "error": format!("Solana address {WALLET} not provisioned")})
        );
    }

    #[tokio::test]
    async fn store_maps_wide_chain_list() {
        let handler = handler();
        let chains: Vec<u64> = (1..=65).collect();

        let response = call(
            &handler,
            json!({"action": "store", "solana_pubkey": USER, "chain_ids": chains, "evm_address": CANONICAL}),
        )
        .await;

        assert_eq!(response["success"], json!(true));
        assert_eq!(response["chain_mappings"].as_object().unwrap().len(), 65);
        assert_eq!(response["chain_mappings"]["65"], json!(CANONICAL));
    }

    #[tokio::test]
    async fn validation_errors_over_json() {
        let handler = handler();

        let empty = call(
            &handler,
            json!({"action": "store", "solana_pubkey": USER, "chain_ids": [], "evm_address": CANONICAL}),
        )
        .await;
        assert_eq!(
            empty,
            json!({"success": false, "error": "chain_ids cannot be empty"})
        );

        for bad in ["cb37000000000000000000000000000000000aee", "0xcb37", "0xgg37000000000000000000000000000000000aee"] {
            let response = call(
                &handler,
                json!({"action": "update", "solana_pubkey": USER, "chain_id": 1, "new_evm_address": bad}),
            )
            .await;
            assert_eq!(response["success"], json!(false));
            assert!(response["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid EVM address format"));
        }
    }
}

//! # Authenticated Flow
//!
//! A wallet asks for a nonce, signs the challenge, and provisions itself
//! through the full runtime; an admin then redirects one chain.

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};
    use provisioner_runtime::{ProvisionerRuntime, RuntimeConfig};
    use serde_json::{json, Value};
    use std::collections::BTreeSet;
    use tokio::io::BufReader;

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

        async fn proof(&self, runtime: &ProvisionerRuntime) -> Value {
            let issued: Value = serde_json::from_str(
                &runtime
                    .gateway()
                    .handle_line(&json!({"action": "nonce", "solana_pubkey": self.pubkey}).to_string())
                    .await,
            )
            .unwrap();
            let signature = self.key.sign(issued["message"].as_str().unwrap().as_bytes());
            json!({
                "signer": self.pubkey,
                "nonce": issued["nonce"],
                "signature": bs58::encode(signature.to_bytes()).into_string(),
            })
        }
    }

    fn runtime(admin: &Wallet) -> ProvisionerRuntime {
        let config = RuntimeConfig {
            require_auth: true,
            admin_pubkeys: BTreeSet::from([admin.pubkey.clone()]),
            cs_bin: None,
            ..RuntimeConfig::default()
        };
        ProvisionerRuntime::new(&config).unwrap()
    }

    async fn call(runtime: &ProvisionerRuntime, request: Value) -> Value {
        serde_json::from_str(&runtime.gateway().handle_line(&request.to_string()).await).unwrap()
    }

    #[tokio::test]
    async fn test_store_then_admin_update() {
        let admin = Wallet::new(0xAD);
        let user = Wallet::new(0x01);
        let runtime = runtime(&admin);
        let minted = "0xcb37000000000000000000000000000000000aee";
        let redirect = "0xb29d000000000000000000000000000000000424";

        let stored = call(
            &runtime,
            json!({
                "action": "store",
                "solana_pubkey": user.pubkey,
                "chain_ids": [1, 137],
                "evm_address": minted,
                "auth": user.proof(&runtime).await,
            }),
        )
        .await;
        assert_eq!(stored["success"], json!(true));

        let updated = call(
            &runtime,
            json!({
                "action": "update",
                "solana_pubkey": user.pubkey,
                "chain_id": 137,
                "new_evm_address": redirect,
                "auth": admin.proof(&runtime).await,
            }),
        )
        .await;
        assert_eq!(updated["success"], json!(true));

        let fetched = call(
            &runtime,
            json!({
                "action": "get",
                "solana_pubkey": user.pubkey,
                "chain_ids": [1, 137],
                "auth": user.proof(&runtime).await,
            }),
        )
        .await;
        assert_eq!(
            fetched,
            json!({
                "success": true,
                "default_address": minted,
                "chain_mappings": {"1": minted, "137": redirect},
            })
        );
    }

    #[tokio::test]
    async fn test_unsigned_request_over_serve_loop() {
        let admin = Wallet::new(0xAD);
        let runtime = runtime(&admin);
        let input = format!(
            "{}\n",
            json!({"action": "get", "solana_pubkey": admin.pubkey, "chain_ids": []})
        );

        let mut output = Vec::new();
        runtime
            .serve(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        let response: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(
            response,
            json!({"success": false, "error": "Authentication required"})
        );
    }
}

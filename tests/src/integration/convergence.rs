//! # Convergence Across Engine Instances
//!
//! Several independent engines share one store, as separate processes share
//! one bucket. Only the store's conditional writes coordinate them.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::seq::SliceRandom;
    use shared_types::ChainId;
    use sp_01_address_mapping::test_utils::{test_address, SequentialKeyProvisioner};
    use sp_01_address_mapping::{
        AddressMappingApi, AddressMappingService, BucketedStore, InMemoryKvStore, KeyValueStore,
    };
    use std::collections::BTreeSet;
    use std::sync::Arc;

    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
    const INSTANCES: usize = 6;

    type SharedEngine = AddressMappingService<BucketedStore<Arc<InMemoryKvStore>>>;

    fn engines(store: &Arc<InMemoryKvStore>, bucket: &str) -> Vec<Arc<SharedEngine>> {
        (0..INSTANCES)
            .map(|_| {
                Arc::new(AddressMappingService::new(BucketedStore::new(
                    Arc::clone(store),
                    bucket,
                )))
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_instances_agree_on_default_and_chains() {
        let store = Arc::new(InMemoryKvStore::new());
        let engines = engines(&store, "solana_to_evm");

        let mut handles = Vec::new();
        for (i, engine) in engines.iter().enumerate() {
            for round in 0..4u64 {
                let engine = Arc::clone(engine);
                let candidate = test_address(i as u64 * 100 + round + 1).to_canonical();
                let mut chains: Vec<ChainId> = vec![1, 10, 137, 8453, 42161];
                chains.shuffle(&mut rand::thread_rng());
                handles.push(tokio::spawn(async move {
                    engine.store(WALLET, &chains, &candidate).await
                }));
            }
        }

        let mut defaults = BTreeSet::new();
        let mut winners = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            defaults.insert(outcome.evm_address);
            winners += usize::from(outcome.default_created);
            assert!(outcome
                .chain_mappings
                .values()
                .all(|a| *a == outcome.evm_address));
        }

        assert_eq!(defaults.len(), 1);
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_provision_across_instances() {
        let store = Arc::new(InMemoryKvStore::new());
        let provisioners: Vec<_> = (0..INSTANCES as u64)
            .map(|i| Arc::new(SequentialKeyProvisioner::starting_at(i * 1_000)))
            .collect();

        let handles: Vec<_> = provisioners
            .iter()
            .map(|p| {
                let engine = AddressMappingService::new(BucketedStore::new(
                    Arc::clone(&store),
                    "solana_to_evm",
                ))
                .with_provisioner(p.clone());
                tokio::spawn(async move { engine.provision(WALLET, &[1, 137]).await })
            })
            .collect();

        let mut canonical = BTreeSet::new();
        for handle in handles {
            canonical.insert(handle.await.unwrap().unwrap().evm_address);
        }
        assert_eq!(canonical.len(), 1);

        let minted: usize = provisioners.iter().map(|p| p.minted_count()).sum();
        assert!((1..=INSTANCES).contains(&minted));
    }

    #[tokio::test]
    async fn test_buckets_do_not_interfere() {
        let store = Arc::new(InMemoryKvStore::new());
        let prod = engines(&store, "solana_to_evm").swap_remove(0);
        let staging = engines(&store, "staging").swap_remove(0);

        prod.store(WALLET, &[1], &test_address(1).to_canonical())
            .await
            .unwrap();
        let staged = staging
            .store(WALLET, &[1], &test_address(2).to_canonical())
            .await
            .unwrap();

        assert!(staged.default_created);
        assert_eq!(staged.evm_address, test_address(2));
        assert_eq!(
            store.get(&format!("staging/default:{WALLET}")).await.unwrap(),
            Some(test_address(2).to_canonical())
        );
        assert_eq!(
            store
                .get(&format!("solana_to_evm/default:{WALLET}"))
                .await
                .unwrap(),
            Some(test_address(1).to_canonical())
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Any interleaving of stores and updates leaves the first stored
        /// address as default, and every chain either untouched or holding
        /// the last update.
        #[test]
        fn prop_interleavings_respect_invariants(
            ops in prop::collection::vec((any::<bool>(), 0u64..4, 1u64..50), 1..40),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let engine = AddressMappingService::new(InMemoryKvStore::new());
                let chains: Vec<ChainId> = (0..4).collect();
                let mut default = None;
                let mut expected: [Option<u64>; 4] = [None; 4];

                for (is_update, chain, n) in ops {
                    let address = test_address(n).to_canonical();
                    if is_update {
                        let result = engine.update(WALLET, chain, &address).await;
                        if default.is_some() {
                            result.unwrap();
                            expected[chain as usize] = Some(n);
                        } else {
                            assert!(result.is_err());
                        }
                    } else {
                        let outcome = engine.store(WALLET, &chains, &address).await.unwrap();
                        let d = *default.get_or_insert(n);
                        assert_eq!(outcome.evm_address, test_address(d));
                        for c in &chains {
                            let want = expected[*c as usize].get_or_insert(d);
                            assert_eq!(outcome.chain_mappings[c], test_address(*want));
                        }
                    }
                }
            });
        }
    }
}

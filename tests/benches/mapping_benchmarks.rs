//! # Address Mapping Benchmarks
//!
//! | Path | Store calls |
//! |------|-------------|
//! | first `store` | 1 + N conditional writes |
//! | repeat `store` | 1 + N conditional writes, 1 + N reads |
//! | `get` | 1 + N reads |
//! | wallet auth | 1 Ed25519 verify + nonce consume |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ed25519_dalek::{Signer, SigningKey};
use sp_01_address_mapping::test_utils::test_address_str;
use sp_01_address_mapping::{AddressMappingApi, AddressMappingService, InMemoryKvStore};
use sp_02_wallet_auth::{challenge_message, AuthProof, NonceStore, WalletAuthenticator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Runtime;

const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime")
}

fn bench_store(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("sp-01-store");

    for chains in [1usize, 8, 64] {
        let chain_ids: Vec<u64> = (1..=chains as u64).collect();
        group.throughput(Throughput::Elements(chains as u64));

        group.bench_with_input(BenchmarkId::new("first", chains), &chain_ids, |b, ids| {
            let service = AddressMappingService::new(InMemoryKvStore::new());
            let counter = AtomicU64::new(0);
            let address = test_address_str(1);
            b.iter(|| {
                // A fresh wallet per iteration so every write is a create.
                let pubkey = format!("bench{}", counter.fetch_add(1, Ordering::Relaxed));
                rt.block_on(service.store(&pubkey, ids, &address)).expect("store")
            })
        });

        group.bench_with_input(BenchmarkId::new("repeat", chains), &chain_ids, |b, ids| {
            let service = AddressMappingService::new(InMemoryKvStore::new());
            rt.block_on(service.store(WALLET, ids, &test_address_str(1)))
                .expect("seed");
            let candidate = test_address_str(2);
            b.iter(|| {
                rt.block_on(service.store(WALLET, ids, black_box(&candidate)))
                    .expect("store")
            })
        });

        group.bench_with_input(BenchmarkId::new("get", chains), &chain_ids, |b, ids| {
            let service = AddressMappingService::new(InMemoryKvStore::new());
            rt.block_on(service.store(WALLET, ids, &test_address_str(1)))
                .expect("seed");
            b.iter(|| rt.block_on(service.get(WALLET, black_box(ids))).expect("get"))
        });
    }

    group.finish();
}

fn bench_wallet_auth(c: &mut Criterion) {
    let key = SigningKey::from_bytes(&[7; 32]);
    let pubkey = bs58::encode(key.verifying_key().to_bytes()).into_string();
    let auth = WalletAuthenticator::new(Arc::new(NonceStore::new(300)));

    c.bench_function("sp-02-authenticate", |b| {
        b.iter_batched(
            || {
                let issued = auth.issue_nonce(&pubkey).expect("nonce");
                let signature = key.sign(challenge_message(&issued.nonce).as_bytes());
                AuthProof {
                    signer: pubkey.clone(),
                    nonce: issued.nonce,
                    signature: bs58::encode(signature.to_bytes()).into_string(),
                }
            },
            |proof| auth.authenticate(&proof).expect("authenticate"),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_store, bench_wallet_auth);
criterion_main!(benches);

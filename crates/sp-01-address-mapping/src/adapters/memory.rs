use crate::ports::outbound::{KeyValueStore, KvStoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// In-memory key-value store.
///
/// `create_if_absent` runs under the write lock, so it is linearizable
/// across every task and thread sharing the store.
#[derive(Default)]
pub struct InMemoryKvStore {
    data: RwLock<HashMap<String, String>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Sorted copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.data
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn create_if_absent(&self, key: &str, value: &str) -> Result<bool, KvStoreError> {
        let mut data = self.data.write();
        if data.contains_key(key) {
            return Ok(false);
        }
        data.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn overwrite(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_if_absent_keeps_first_value() {
        let store = InMemoryKvStore::new();

        assert!(store.create_if_absent("k", "first").await.unwrap());
        assert!(!store.create_if_absent("k", "second").await.unwrap());

        assert_eq!(store.get("k").await.unwrap(), Some("first".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_and_creates() {
        let store = InMemoryKvStore::new();

        store.overwrite("k", "a").await.unwrap();
        store.overwrite("k", "b").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("b".to_string()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_if_absent_has_one_winner() {
        let store = Arc::new(InMemoryKvStore::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create_if_absent("race", &format!("writer-{i}"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}

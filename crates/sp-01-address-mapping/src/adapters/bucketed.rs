use crate::ports::outbound::{KeyValueStore, KvStoreError};
use async_trait::async_trait;

/// Scopes every key under `{bucket}/` so several logical buckets can share
/// one physical store.
pub struct BucketedStore<S> {
    inner: S,
    prefix: String,
}

impl<S: KeyValueStore> BucketedStore<S> {
    pub fn new(inner: S, bucket: &str) -> Self {
        Self {
            inner,
            prefix: format!("{bucket}/"),
        }
    }

    pub fn bucket(&self) -> &str {
        self.prefix.trim_end_matches('/')
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for BucketedStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        self.inner.get(&self.scoped(key)).await
    }

    async fn create_if_absent(&self, key: &str, value: &str) -> Result<bool, KvStoreError> {
        self.inner.create_if_absent(&self.scoped(key), value).await
    }

    async fn overwrite(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        self.inner.overwrite(&self.scoped(key), value).await
    }
}

//! # RocksDB Storage Adapter
//!
//! Durable single-node `KeyValueStore`.
//!
//! RocksDB has no native insert-if-absent, so `create_if_absent` does a
//! read-then-put under a process-wide mutex. This makes the adapter
//! linearizable for one process only: several processes must not open the
//! same directory (RocksDB's own lock file enforces this).
//!
//! Every call runs under `spawn_blocking`, so a synced write never parks a
//! runtime worker.

use crate::ports::outbound::{KeyValueStore, KvStoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use rocksdb::{Options, WriteOptions, DB};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;
use tracing::info;

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/mappings"),
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (small buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

pub struct RocksDbKvStore {
    inner: Arc<RocksDbInner>,
}

struct RocksDbInner {
    db: DB,
    config: RocksDbConfig,
    /// Serializes the read-then-put of `create_if_absent` against all writes.
    write_lock: Mutex<()>,
}

impl RocksDbKvStore {
    /// Open or create a database.
    pub fn open(config: RocksDbConfig) -> Result<Self, KvStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, &config.path).map_err(|e| KvStoreError::Backend {
            message: format!("Failed to open RocksDB: {e}"),
        })?;
        info!(path = %config.path.display(), "Opened RocksDB mapping store");

        Ok(Self {
            inner: Arc::new(RocksDbInner {
                db,
                config,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Run a RocksDB call on the blocking pool; reads and synced writes
    /// may sit on disk I/O.
    async fn blocking<T, F>(&self, op: F) -> Result<T, KvStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&RocksDbInner) -> Result<T, KvStoreError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        task::spawn_blocking(move || op(&*inner))
            .await
            .map_err(|e| KvStoreError::Unavailable {
                message: format!("RocksDB task failed: {e}"),
            })?
    }
}

impl RocksDbInner {
    fn write_opts(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.config.sync_writes);
        opts
    }

    fn read(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let raw = self.db.get(key.as_bytes()).map_err(|e| KvStoreError::Unavailable {
            message: format!("RocksDB get failed: {e}"),
        })?;
        raw.map(|bytes| {
            String::from_utf8(bytes).map_err(|_| KvStoreError::InvalidValue {
                key: key.to_string(),
            })
        })
        .transpose()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        self.db
            .put_opt(key.as_bytes(), value.as_bytes(), &self.write_opts())
            .map_err(|e| KvStoreError::Unavailable {
                message: format!("RocksDB put failed: {e}"),
            })
    }

    fn insert_if_absent(&self, key: &str, value: &str) -> Result<bool, KvStoreError> {
        let _guard = self.write_lock.lock();
        let existing = self
            .db
            .get_pinned(key.as_bytes())
            .map_err(|e| KvStoreError::Unavailable {
                message: format!("RocksDB get failed: {e}"),
            })?;
        if existing.is_some() {
            return Ok(false);
        }
        self.write(key, value)?;
        Ok(true)
    }

    fn replace(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        let _guard = self.write_lock.lock();
        self.write(key, value)
    }
}

#[async_trait]
impl KeyValueStore for RocksDbKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let key = key.to_string();
        self.blocking(move |db| db.read(&key)).await
    }

    async fn create_if_absent(&self, key: &str, value: &str) -> Result<bool, KvStoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.blocking(move |db| db.insert_if_absent(&key, &value)).await
    }

    async fn overwrite(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.blocking(move |db| db.replace(&key, &value)).await
    }
}

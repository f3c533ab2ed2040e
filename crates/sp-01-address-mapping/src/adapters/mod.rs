//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait.

mod bucketed;
mod memory;
#[cfg(feature = "rocksdb")]
mod rocksdb;

pub use bucketed::BucketedStore;
pub use memory::InMemoryKvStore;
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbKvStore};

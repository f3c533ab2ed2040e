//! Runtime configuration from environment variables.

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_BUCKET: &str = "solana_to_evm";
pub const DEFAULT_DATA_DIR: &str = "./data/mappings";
pub const DEFAULT_CS_BIN: &str = "cs";

/// Where mappings are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local, lost on exit.
    Memory,
    /// RocksDB under `data_dir` (requires feature `rocksdb`).
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "rocksdb" => Ok(StorageBackend::RocksDb),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown storage backend {0:?} (expected memory or rocksdb)")]
    UnknownBackend(String),

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("SP_REQUIRE_AUTH is on but SP_ADMIN_PUBKEYS is empty; nobody could update")]
    NoAdmins,

    #[error("rocksdb backend requested but this binary was built without the rocksdb feature")]
    RocksDbUnavailable,

    #[error("nonce TTL must be positive")]
    ZeroNonceTtl,

    #[error("bucket name must not be empty")]
    EmptyBucket,
}

/// Configuration for the provisioner runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Key namespace within the store
    pub bucket: String,

    pub backend: StorageBackend,

    /// RocksDB directory
    pub data_dir: PathBuf,

    /// Log level filter (trace, debug, info, warn, error, or a directive list)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Lifetime of authentication nonces (seconds)
    pub nonce_ttl_secs: u64,

    /// Whether every action must carry a wallet signature
    pub require_auth: bool,

    /// Wallets allowed to `update`
    pub admin_pubkeys: BTreeSet<String>,

    /// CubeSigner CLI; `None` disables `provision`
    pub cs_bin: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: "info".to_string(),
            json_logs: false,
            nonce_ttl_secs: sp_02_wallet_auth::DEFAULT_NONCE_TTL_SECS,
            require_auth: false,
            admin_pubkeys: BTreeSet::new(),
            cs_bin: Some(DEFAULT_CS_BIN.to_string()),
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SP_BUCKET`: Key namespace (default: solana_to_evm)
    /// - `SP_BACKEND`: `memory` or `rocksdb` (default: memory)
    /// - `SP_DATA_DIR`: RocksDB directory (default: ./data/mappings)
    /// - `SP_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `SP_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `SP_NONCE_TTL_SECS`: Nonce lifetime (default: 300)
    /// - `SP_REQUIRE_AUTH`: Require wallet signatures (default: false)
    /// - `SP_ADMIN_PUBKEYS`: Comma-separated wallets allowed to update
    /// - `SP_CS_BIN`: CubeSigner CLI path, empty to disable (default: cs)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup("SP_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.backend,
        };

        let nonce_ttl_secs = match lookup("SP_NONCE_TTL_SECS") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "SP_NONCE_TTL_SECS",
                value: v,
            })?,
            None => defaults.nonce_ttl_secs,
        };

        let require_auth = match lookup("SP_REQUIRE_AUTH") {
            Some(v) => parse_bool("SP_REQUIRE_AUTH", &v)?,
            None => defaults.require_auth,
        };

        let json_logs = match lookup("SP_JSON_LOGS") {
            Some(v) => parse_bool("SP_JSON_LOGS", &v)?,
            None => defaults.json_logs,
        };

        let admin_pubkeys = lookup("SP_ADMIN_PUBKEYS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let cs_bin = match lookup("SP_CS_BIN") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => defaults.cs_bin,
        };

        Ok(Self {
            bucket: lookup("SP_BUCKET").unwrap_or(defaults.bucket),
            backend,
            data_dir: lookup("SP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_level: lookup("SP_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs,
            nonce_ttl_secs,
            require_auth,
            admin_pubkeys,
            cs_bin,
        })
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::EmptyBucket);
        }
        if self.nonce_ttl_secs == 0 {
            return Err(ConfigError::ZeroNonceTtl);
        }
        if self.require_auth && self.admin_pubkeys.is_empty() {
            return Err(ConfigError::NoAdmins);
        }
        if self.backend == StorageBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::RocksDbUnavailable);
        }
        Ok(())
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}

//! # Skate Provisioner Runtime
//!
//! Wires the mapping engine (sp-01), wallet authentication (sp-02) and the
//! CubeSigner provisioner into one process serving JSON lines.
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig` from `SP_*` environment variables
//! - `logging` - `tracing-subscriber` setup (stderr, optional JSON)
//! - `gateway` - nonce issuance and access policy in front of the engine
//! - `provisioner` - `CubeSignerCliProvisioner`
//!
//! ## Startup Sequence
//!
//! 1. Load and validate configuration
//! 2. Initialize logging
//! 3. Open the store backend and scope it to the bucket
//! 4. Build engine, authenticator, gateway
//! 5. Spawn the nonce sweeper, then serve stdin until EOF or Ctrl-C

pub mod config;
pub mod gateway;
pub mod logging;
pub mod provisioner;

pub use config::{ConfigError, RuntimeConfig, StorageBackend};
pub use gateway::{AccessPolicy, Gateway, GatewayError, GatewayResponse, NonceResponse};
pub use provisioner::CubeSignerCliProvisioner;

use anyhow::{Context, Result};
use sp_01_address_mapping::{
    ActionResponse, AddressMappingService, BucketedStore, InMemoryKvStore, KeyValueStore,
    MappingRequestHandler,
};
use sp_02_wallet_auth::{NonceStore, WalletAuthenticator};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Longest request line `serve` accepts, excluding the newline.
pub const MAX_REQUEST_LINE_BYTES: usize = 64 * 1024;

/// The assembled provisioner.
pub struct ProvisionerRuntime {
    gateway: Arc<Gateway>,
    nonces: Arc<NonceStore>,
    sweep_interval: Duration,
}

impl ProvisionerRuntime {
    /// Build every component from `config`. Does not install logging.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let backend = open_backend(config)?;
        let store = BucketedStore::new(backend, &config.bucket);

        let mut service = AddressMappingService::new(store);
        if let Some(cs_bin) = &config.cs_bin {
            service = service.with_provisioner(Arc::new(CubeSignerCliProvisioner::new(cs_bin)));
        }

        let nonces = Arc::new(NonceStore::new(config.nonce_ttl_secs));
        let gateway = Gateway::new(
            MappingRequestHandler::new(Arc::new(service)),
            WalletAuthenticator::new(Arc::clone(&nonces)),
            AccessPolicy {
                require_auth: config.require_auth,
                admin_pubkeys: config.admin_pubkeys.clone(),
            },
        );

        info!(
            bucket = %config.bucket,
            backend = ?config.backend,
            require_auth = config.require_auth,
            admins = config.admin_pubkeys.len(),
            provisioner = config.cs_bin.is_some(),
            "Provisioner runtime assembled"
        );

        Ok(Self {
            gateway: Arc::new(gateway),
            nonces,
            sweep_interval: Duration::from_secs(config.nonce_ttl_secs),
        })
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Periodically drop expired nonces. Runs until aborted.
    pub fn spawn_nonce_sweeper(&self) -> JoinHandle<()> {
        let nonces = Arc::clone(&self.nonces);
        let period = self.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let swept = nonces.sweep_expired();
                if swept > 0 {
                    debug!(swept, outstanding = nonces.len(), "Swept expired nonces");
                }
            }
        })
    }

    /// Answer each request line from `reader` with one response line on
    /// `writer`, in order, until EOF. Blank lines are skipped. A line that
    /// is not UTF-8 or exceeds [`MAX_REQUEST_LINE_BYTES`] gets an error
    /// response and the loop continues; only I/O failures end it.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = (&mut reader)
                .take(MAX_REQUEST_LINE_BYTES as u64 + 1)
                .read_until(b'\n', &mut buf)
                .await
                .context("failed to read request")?;
            if read == 0 {
                break;
            }

            let response = if buf.len() > MAX_REQUEST_LINE_BYTES && buf.last() != Some(&b'\n') {
                discard_line(&mut reader)
                    .await
                    .context("failed to read request")?;
                warn!(limit = MAX_REQUEST_LINE_BYTES, "Rejected oversized request line");
                ActionResponse::error(format!(
                    "Invalid request: line exceeds {MAX_REQUEST_LINE_BYTES} bytes"
                ))
                .to_json()
            } else {
                match std::str::from_utf8(&buf) {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => {
                        let line = line.trim_end_matches(&['\r', '\n'][..]);
                        self.gateway.handle_line(line).await
                    }
                    Err(e) => {
                        warn!(error = %e, "Rejected non-UTF-8 request line");
                        ActionResponse::error(format!("Invalid request: {e}")).to_json()
                    }
                }
            };

            writer
                .write_all(response.as_bytes())
                .await
                .context("failed to write response")?;
            writer
                .write_all(b"\n")
                .await
                .context("failed to write response")?;
            writer.flush().await.context("failed to flush response")?;
        }
        debug!("Request stream closed");
        Ok(())
    }
}

/// Skip the rest of the current line, up to and including its newline.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}

fn open_backend(config: &RuntimeConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryKvStore::new())),
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb => {
            let store = sp_01_address_mapping::RocksDbKvStore::open(
                sp_01_address_mapping::RocksDbConfig {
                    path: config.data_dir.clone(),
                    ..Default::default()
                },
            )
            .with_context(|| format!("failed to open {}", config.data_dir.display()))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb => Err(ConfigError::RocksDbUnavailable.into()),
    }
}

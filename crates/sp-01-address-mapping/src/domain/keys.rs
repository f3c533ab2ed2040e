//! # Key Layout
//!
//! Keys inside one deployment bucket. Values are canonical address strings.

use shared_types::{ChainId, SolanaPubkey};

/// Prefix of every default-mapping key.
pub const DEFAULT_KEY_PREFIX: &str = "default:";

/// Pubkey that would make `{pubkey}:{chain}` collide with `default:{chain}`.
pub const RESERVED_PUBKEY: &str = "default";

/// Builds store keys for a wallet's mappings.
pub struct MappingKeys;

impl MappingKeys {
    /// Whether `pubkey` cannot be used as a key fragment.
    pub fn is_reserved(pubkey: &SolanaPubkey) -> bool {
        pubkey.as_str() == RESERVED_PUBKEY
    }

    /// `default:{pubkey}` - the wallet's anchor address.
    pub fn default_key(pubkey: &SolanaPubkey) -> String {
        format!("{}{}", DEFAULT_KEY_PREFIX, pubkey)
    }

    /// `{pubkey}:{chain_id}` - the address in effect on one chain.
    pub fn chain_key(pubkey: &SolanaPubkey, chain_id: ChainId) -> String {
        format!("{}:{}", pubkey, chain_id)
    }
}

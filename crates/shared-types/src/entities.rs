//! # Core Domain Entities
//!
//! - `SolanaPubkey`: opaque wallet identity, used as a key fragment
//! - `ChainId`: EVM chain identifier
//! - `EvmAddress`: 20-byte Secp256k1-derived account address

use crate::errors::AddressParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EVM chain identifier (1 = Ethereum, 137 = Polygon, 42161 = Arbitrum, ...).
pub type ChainId = u64;

/// Longest Base58 string a 32-byte key can encode to.
pub const MAX_PUBKEY_LEN: usize = 44;

/// Number of hex characters after the `0x` prefix.
pub const EVM_ADDRESS_HEX_LEN: usize = 40;

// =============================================================================
// SOLANA PUBKEY
// =============================================================================

/// Base58-encoded Ed25519 public key of a Solana wallet.
///
/// Only the *shape* is checked: non-empty, alphanumeric, at most
/// [`MAX_PUBKEY_LEN`] characters. The alphanumeric rule keeps `:` out, so a
/// pubkey can never forge another wallet's `default:` or `{pubkey}:{chain}`
/// key. Whether the bytes decode to a valid curve point is the
/// authentication layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SolanaPubkey(String);

impl SolanaPubkey {
    /// Parse and shape-check a pubkey string.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        if raw.is_empty() {
            return Err(AddressParseError::EmptyPubkey);
        }
        if raw.len() > MAX_PUBKEY_LEN {
            return Err(AddressParseError::PubkeyTooLong {
                len: raw.len(),
                max: MAX_PUBKEY_LEN,
            });
        }
        if let Some(bad) = raw.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(AddressParseError::PubkeyCharset(bad));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SolanaPubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SolanaPubkey {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SolanaPubkey {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SolanaPubkey> for String {
    fn from(value: SolanaPubkey) -> Self {
        value.0
    }
}

// =============================================================================
// EVM ADDRESS
// =============================================================================

/// A 20-byte EVM account address.
///
/// Parsing accepts `0x` followed by 40 hex digits in either case (so EIP-55
/// checksummed input is fine); the canonical text form is always lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EvmAddress([u8; 20]);

impl EvmAddress {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse `0x` + 40 hex characters.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        let body = raw
            .strip_prefix("0x")
            .ok_or(AddressParseError::MissingPrefix)?;
        if body.len() != EVM_ADDRESS_HEX_LEN {
            return Err(AddressParseError::WrongLength {
                expected: EVM_ADDRESS_HEX_LEN,
                actual: body.len(),
            });
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(body, &mut bytes).map_err(|_| AddressParseError::NonHex)?;
        Ok(Self(bytes))
    }

    /// Canonical `0x` + lowercase hex form.
    pub fn to_canonical(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for EvmAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EvmAddress {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EvmAddress> for String {
    fn from(value: EvmAddress) -> Self {
        value.to_canonical()
    }
}

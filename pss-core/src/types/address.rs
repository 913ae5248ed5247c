//! Address types for PSS.
//!
//! - [`EthAddress`]: 20-byte account address derived from a public key
//! - [`ChunkAddress`]: 32-byte content address of a chunk (or an overlay node)

use serde::{Deserialize, Serialize};

use crate::constants::{CHUNK_ADDRESS_SIZE, ETH_ADDRESS_SIZE};
use crate::error::{PssError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// ETHEREUM ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// An Ethereum-style account address.
///
/// `keccak256(uncompressed_pubkey[1..])[12..32]`; computed in `pss-crypto`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EthAddress {
    bytes: [u8; ETH_ADDRESS_SIZE],
}

impl EthAddress {
    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; ETH_ADDRESS_SIZE] = bytes.try_into().map_err(|_| {
            PssError::InvalidEncoding(format!(
                "expected {} bytes for address, got {}",
                ETH_ADDRESS_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; ETH_ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the `0x`-prefixed lowercase hex string.
    pub fn to_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parses from hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Returns true if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl std::fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EthAddress({})", self.to_hex_string())
    }
}

impl std::fmt::Display for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl Serialize for EthAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for EthAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHUNK ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte position in the network's address space.
///
/// Chunks are stored under the hash of their content; nodes sit at their
/// overlay address. Both share this type so targets can be built from either.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkAddress {
    bytes: [u8; CHUNK_ADDRESS_SIZE],
}

impl ChunkAddress {
    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; CHUNK_ADDRESS_SIZE] = bytes.try_into().map_err(|_| {
            PssError::InvalidEncoding(format!(
                "expected {} bytes for chunk address, got {}",
                CHUNK_ADDRESS_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; CHUNK_ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the address as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; CHUNK_ADDRESS_SIZE] {
        &self.bytes
    }

    /// Returns true if the address begins with `prefix`.
    pub fn has_prefix(&self, prefix: &[u8]) -> bool {
        self.bytes.starts_with(prefix)
    }

    /// Number of leading bits shared with `other` (Kademlia proximity order).
    pub fn proximity(&self, other: &ChunkAddress) -> u32 {
        let mut po = 0;
        for (a, b) in self.bytes.iter().zip(other.bytes.iter()) {
            let diff = a ^ b;
            if diff != 0 {
                return po + diff.leading_zeros();
            }
            po += 8;
        }
        po
    }

    /// Returns hex-encoded address (no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parses from hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for ChunkAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChunkAddress({})", self.to_hex())
    }
}

impl std::fmt::Display for ChunkAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for ChunkAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChunkAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

//! Topic identifiers.
//!
//! A topic is the keccak256 of a UTF-8 label; the hashing lives in
//! `pss-crypto::topic`. The 32 bytes are sealed inside every trojan envelope
//! and compared bit-for-bit on unwrap.

use serde::{Deserialize, Serialize};

use crate::constants::TOPIC_SIZE;
use crate::error::{PssError, Result};

/// A 32-byte topic identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Topic {
    bytes: [u8; TOPIC_SIZE],
}

impl Topic {
    /// Creates a topic from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; TOPIC_SIZE] = bytes.try_into().map_err(|_| {
            PssError::InvalidEncoding(format!(
                "topic must be {} bytes, got {}",
                TOPIC_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Creates a topic from a fixed-size array.
    pub fn from_array(bytes: [u8; TOPIC_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the topic as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; TOPIC_SIZE] {
        &self.bytes
    }

    /// Returns hex-encoded topic.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Creates from hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl AsRef<[u8]> for Topic {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Topic({})", self.to_hex())
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Topic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

//! Key encodings for PSS.
//!
//! These are the persisted/exchanged byte forms. The curve arithmetic lives in
//! `pss-crypto`; this module only fixes the sizes and secret handling.
//!
//! - [`EncodedKey`]: 32-byte big-endian private scalar (zeroized on drop)

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::PRIVATE_KEY_SIZE;
use crate::error::{PssError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// ENCODED PRIVATE KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A private key in its canonical wire form.
///
/// Exactly the big-endian scalar, left-padded with zeros to 32 bytes. There is
/// no version tag; any implementation over secp256k1 reads the same bytes.
///
/// Range checks happen when the bytes are turned into a usable key, so an
/// `EncodedKey` on its own only guarantees the length.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncodedKey {
    bytes: [u8; PRIVATE_KEY_SIZE],
}

impl EncodedKey {
    /// Creates an encoded key from raw bytes.
    ///
    /// # Errors
    /// Returns `InvalidEncoding` if the length is not `PRIVATE_KEY_SIZE`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(PssError::InvalidEncoding(format!(
                "private key must be {} bytes, got {}",
                PRIVATE_KEY_SIZE,
                bytes.len()
            )));
        }

        let mut arr = [0u8; PRIVATE_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates an encoded key from a fixed-size array.
    pub fn from_array(bytes: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; PRIVATE_KEY_SIZE] {
        &self.bytes
    }

    /// Returns the hex-encoded key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Creates an encoded key from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = hex::decode(s)?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }
}

impl std::fmt::Debug for EncodedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncodedKey([REDACTED])")
    }
}

// Serde uses hex so encoded keys drop straight into JSON key files.
impl Serialize for EncodedKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EncodedKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_key_from_bytes() {
        let bytes = [42u8; PRIVATE_KEY_SIZE];
        let key = EncodedKey::from_bytes(&bytes).unwrap();
        assert_eq!(key.as_bytes(), &bytes);
    }

    #[test]
    fn test_encoded_key_wrong_size() {
        assert!(matches!(
            EncodedKey::from_bytes(&[1u8; 31]),
            Err(PssError::InvalidEncoding(_))
        ));
        assert!(matches!(
            EncodedKey::from_bytes(&[1u8; 33]),
            Err(PssError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_encoded_key_hex_roundtrip() {
        let key = EncodedKey::from_array([0xAB; PRIVATE_KEY_SIZE]);
        let key2 = EncodedKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key, key2);
    }

    #[test]
    fn test_encoded_key_debug_redacted() {
        let key = EncodedKey::from_array([0x11; PRIVATE_KEY_SIZE]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("11"));
    }

    #[test]
    fn test_encoded_key_serde() {
        let key = EncodedKey::from_array([0x12; PRIVATE_KEY_SIZE]);
        let json = serde_json::to_string(&key).unwrap();
        let key2: EncodedKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, key2);
    }
}

//! Recoverable signature bytes.
//!
//! # Wire Format
//! ```text
//! r (32) || s (32) || v (1)        v = recovery_id + 27
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{SIGNATURE_SIZE, SIGNATURE_V_OFFSET};
use crate::error::{PssError, Result};

/// A 65-byte recoverable ECDSA signature.
///
/// Only the length is checked here; range checks on `r`, `s` and the recovery
/// id happen during recovery.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    bytes: [u8; SIGNATURE_SIZE],
}

impl Signature {
    /// Creates a signature from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_SIZE] = bytes.try_into().map_err(|_| {
            PssError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self { bytes }
    }

    /// Assembles a signature from its parts; `recovery_id` is stored as `v = id + 27`.
    ///
    /// # Errors
    /// Returns `InvalidSignature` if `recovery_id` is not in `0..=3`.
    pub fn from_parts(r: &[u8; 32], s: &[u8; 32], recovery_id: u8) -> Result<Self> {
        if recovery_id > 3 {
            return Err(PssError::InvalidSignature(format!(
                "recovery id must be 0..=3, got {}",
                recovery_id
            )));
        }
        let mut bytes = [0u8; SIGNATURE_SIZE];
        bytes[..32].copy_from_slice(r);
        bytes[32..64].copy_from_slice(s);
        bytes[64] = recovery_id + SIGNATURE_V_OFFSET;
        Ok(Self { bytes })
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the `r || s` part.
    pub fn rs(&self) -> &[u8] {
        &self.bytes[..64]
    }

    /// Returns the `v` byte as stored.
    pub fn v(&self) -> u8 {
        self.bytes[64]
    }

    /// Returns the recovery id, or `None` when `v` is outside `27..=30`.
    pub fn recovery_id(&self) -> Option<u8> {
        match self.v().checked_sub(SIGNATURE_V_OFFSET) {
            Some(id) if id <= 3 => Some(id),
            _ => None,
        }
    }

    /// Returns hex-encoded signature.
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

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
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
    use test_case::test_case;

    #[test]
    fn test_signature_parts() {
        let sig = Signature::from_parts(&[1u8; 32], &[2u8; 32], 1).unwrap();
        assert_eq!(&sig.as_bytes()[..32], &[1u8; 32]);
        assert_eq!(&sig.as_bytes()[32..64], &[2u8; 32]);
        assert_eq!(sig.v(), 28);
        assert_eq!(sig.recovery_id(), Some(1));
    }

    #[test_case(4 ; "just above range")]
    #[test_case(229 ; "would overflow v")]
    #[test_case(255 ; "max")]
    fn test_signature_parts_rejects_bad_recovery_id(recovery_id: u8) {
        assert!(matches!(
            Signature::from_parts(&[1u8; 32], &[2u8; 32], recovery_id),
            Err(PssError::InvalidSignature(_))
        ));
    }

    #[test_case(27 => Some(0))]
    #[test_case(28 => Some(1))]
    #[test_case(30 => Some(3))]
    #[test_case(0 => None)]
    #[test_case(31 => None)]
    fn test_recovery_id(v: u8) -> Option<u8> {
        let mut bytes = [0u8; SIGNATURE_SIZE];
        bytes[64] = v;
        Signature::from_array(bytes).recovery_id()
    }

    #[test]
    fn test_signature_wrong_size() {
        assert!(matches!(
            Signature::from_bytes(&[0u8; 64]),
            Err(PssError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_signature_hex_roundtrip() {
        let sig = Signature::from_parts(&[0xAA; 32], &[0xBB; 32], 0).unwrap();
        let sig2 = Signature::from_hex(&format!("0x{}", sig.to_hex())).unwrap();
        assert_eq!(sig, sig2);
    }
}

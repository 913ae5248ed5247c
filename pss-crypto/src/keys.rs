//! secp256k1 key handling.
//!
//! [`PrivateKey`] is a non-zero scalar below the curve order. Its canonical
//! encoding ([`EncodedKey`]) is exactly 32 bytes, big-endian, left-padded with
//! zeros, so the codec is a bijection between valid keys and valid encodings.
//!
//! [`PublicKey`] is a curve point other than the identity. It serializes to
//! 33-byte compressed SEC1 by default; the 65-byte uncompressed form is what
//! Ethereum addresses are derived from.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, NonZeroScalar, SecretKey};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use pss_core::constants::{
    COMPRESSED_PUBLIC_KEY_SIZE, PRIVATE_KEY_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE,
};
use pss_core::error::{PssError, Result};
use pss_core::types::EncodedKey;

// ═══════════════════════════════════════════════════════════════════════════════
// PRIVATE KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A secp256k1 private key. Zeroized on drop.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SecretKey,
}

impl PrivateKey {
    /// Generates a key from the operating system RNG.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generates a key from the given RNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            inner: SecretKey::random(rng),
        }
    }

    /// Builds a key from a 32-byte big-endian scalar.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the scalar is zero or not below the curve order.
    pub fn from_scalar_bytes(bytes: &[u8; PRIVATE_KEY_SIZE]) -> Result<Self> {
        SecretKey::from_bytes(FieldBytes::from_slice(bytes))
            .map(|inner| Self { inner })
            .map_err(|_| PssError::InvalidKey("scalar is zero or out of range".into()))
    }

    /// Returns the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.public_key(),
        }
    }

    /// Returns the canonical 32-byte encoding.
    pub fn to_encoded(&self) -> EncodedKey {
        let bytes = Zeroizing::new(self.inner.to_bytes());
        let mut array = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        array.copy_from_slice(bytes.as_slice());
        EncodedKey::from_array(*array)
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.inner
    }

    pub(crate) fn scalar(&self) -> NonZeroScalar {
        self.inner.to_nonzero_scalar()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        let a = Zeroizing::new(self.inner.to_bytes());
        let b = Zeroizing::new(other.inner.to_bytes());
        a.as_slice().ct_eq(b.as_slice()).into()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public", &self.public_key())
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY CODEC
// ═══════════════════════════════════════════════════════════════════════════════

/// Generates a new random private key.
pub fn generate_private_key() -> PrivateKey {
    PrivateKey::generate()
}

/// Encodes a private key as 32 big-endian bytes.
pub fn encode_private_key(key: &PrivateKey) -> EncodedKey {
    key.to_encoded()
}

/// Decodes a 32-byte big-endian private key.
///
/// # Errors
/// Returns `InvalidEncoding` if the input is not exactly 32 bytes, is zero,
/// or is not below the curve order.
pub fn decode_private_key(bytes: &[u8]) -> Result<PrivateKey> {
    let encoded = EncodedKey::from_bytes(bytes)?;
    PrivateKey::from_scalar_bytes(encoded.as_array())
        .map_err(|_| PssError::InvalidEncoding("private key scalar is zero or out of range".into()))
}

impl From<&PrivateKey> for EncodedKey {
    fn from(key: &PrivateKey) -> Self {
        key.to_encoded()
    }
}

impl TryFrom<&EncodedKey> for PrivateKey {
    type Error = PssError;

    fn try_from(encoded: &EncodedKey) -> Result<Self> {
        decode_private_key(encoded.as_bytes())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: k256::PublicKey,
}

impl PublicKey {
    /// Parses a SEC1 encoded point (33-byte compressed or 65-byte uncompressed).
    ///
    /// # Errors
    /// Returns `InvalidKey` if the bytes are not a point on the curve.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            COMPRESSED_PUBLIC_KEY_SIZE | UNCOMPRESSED_PUBLIC_KEY_SIZE => {}
            n => {
                return Err(PssError::InvalidKey(format!(
                    "public key must be {} or {} bytes, got {}",
                    COMPRESSED_PUBLIC_KEY_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE, n
                )))
            }
        }
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(|_| PssError::InvalidKey("not a valid secp256k1 point".into()))
    }

    /// Returns the 33-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_PUBLIC_KEY_SIZE] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_PUBLIC_KEY_SIZE];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Returns the 65-byte uncompressed encoding (`0x04 || x || y`).
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_PUBLIC_KEY_SIZE] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_PUBLIC_KEY_SIZE];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Returns hex-encoded compressed key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Creates from hex string (compressed or uncompressed).
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_sec1_bytes(&hex::decode(s)?)
    }

    pub(crate) fn as_k256(&self) -> &k256::PublicKey {
        &self.inner
    }
}

impl From<k256::PublicKey> for PublicKey {
    fn from(inner: k256::PublicKey) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

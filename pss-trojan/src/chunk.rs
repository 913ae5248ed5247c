//! Trojan chunk container.
//!
//! ```text
//! offset  size  field
//! 0       32    nonce
//! 32      33    ephemeral public key (compressed)
//! 65      3999  ciphertext
//! 4064    32    tag
//! ```

use serde::{Deserialize, Serialize};

use pss_core::constants::{
    CHUNK_SIZE, CIPHERTEXT_OFFSET, EPHEMERAL_KEY_OFFSET, NONCE_SIZE, TAG_OFFSET,
};
use pss_core::error::{PssError, Result};
use pss_core::traits::ChunkHasher;
use pss_core::types::ChunkAddress;
use pss_crypto::PublicKey;

/// A 4096-byte trojan chunk and its content address.
///
/// Chunks built by wrap or [`from_bytes`](Self::from_bytes) carry an address
/// computed from their data. A deserialized chunk carries whatever address the
/// sender wrote, since the hash function is not known at that point; run
/// [`verify_address`](Self::verify_address) before trusting it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChunkRepr", into = "ChunkRepr")]
pub struct TrojanChunk {
    data: Vec<u8>,
    address: ChunkAddress,
}

impl TrojanChunk {
    pub(crate) fn new(data: Vec<u8>, address: ChunkAddress) -> Self {
        debug_assert_eq!(data.len(), CHUNK_SIZE);
        Self { data, address }
    }

    /// Wraps raw chunk bytes, computing the address with `hasher`.
    ///
    /// # Errors
    /// Returns `InvalidChunk` if `bytes` is not exactly `CHUNK_SIZE` long.
    pub fn from_bytes<H: ChunkHasher>(bytes: &[u8], hasher: &H) -> Result<Self> {
        check_size(bytes.len())?;
        Ok(Self {
            data: bytes.to_vec(),
            address: hasher.address(bytes),
        })
    }

    /// Parses hex chunk bytes.
    pub fn from_hex<H: ChunkHasher>(s: &str, hasher: &H) -> Result<Self> {
        Self::from_bytes(&hex::decode(s)?, hasher)
    }

    /// The raw chunk bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the chunk, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The chunk's content address.
    pub fn address(&self) -> &ChunkAddress {
        &self.address
    }

    /// Recomputes the address and compares it with the stored one.
    pub fn verify_address<H: ChunkHasher>(&self, hasher: &H) -> bool {
        hasher.address(&self.data) == self.address
    }

    /// The mined nonce.
    pub fn nonce(&self) -> &[u8] {
        &self.data[..NONCE_SIZE]
    }

    /// The embedded ephemeral public key.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the bytes are not a curve point, which is the
    /// case for most chunks that are not trojans.
    pub fn ephemeral_public_key(&self) -> Result<PublicKey> {
        PublicKey::from_sec1_bytes(&self.data[EPHEMERAL_KEY_OFFSET..CIPHERTEXT_OFFSET])
    }

    /// The encrypted envelope.
    pub fn ciphertext(&self) -> &[u8] {
        &self.data[CIPHERTEXT_OFFSET..TAG_OFFSET]
    }

    /// The authentication tag.
    pub fn tag(&self) -> &[u8] {
        &self.data[TAG_OFFSET..]
    }

    /// Returns hex-encoded chunk bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.data)
    }
}

impl AsRef<[u8]> for TrojanChunk {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for TrojanChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrojanChunk")
            .field("address", &self.address)
            .field("size", &self.data.len())
            .finish()
    }
}

pub(crate) fn check_size(len: usize) -> Result<()> {
    if len != CHUNK_SIZE {
        return Err(PssError::InvalidChunk(format!(
            "chunk is {} bytes, expected {}",
            len, CHUNK_SIZE
        )));
    }
    Ok(())
}

/// Serialized form: the address as carried (unchecked), the bytes as hex.
#[derive(Serialize, Deserialize)]
struct ChunkRepr {
    address: ChunkAddress,
    data: String,
}

impl TryFrom<ChunkRepr> for TrojanChunk {
    type Error = PssError;

    fn try_from(repr: ChunkRepr) -> Result<Self> {
        let data = hex::decode(&repr.data)?;
        check_size(data.len())?;
        Ok(Self {
            data,
            address: repr.address,
        })
    }
}

impl From<TrojanChunk> for ChunkRepr {
    fn from(chunk: TrojanChunk) -> Self {
        Self {
            data: chunk.to_hex(),
            address: chunk.address,
        }
    }
}

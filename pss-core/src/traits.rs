//! Common traits for PSS.
//!
//! The chunk address function belongs to the storage network, not to this
//! workspace. It is consumed through [`ChunkHasher`] so wrap/unwrap can run
//! against whatever hash the network uses.

use crate::types::ChunkAddress;

// ═══════════════════════════════════════════════════════════════════════════════
// CHUNK HASHER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes the content address of a chunk.
///
/// Implementations must be deterministic and pure: the mining loop calls
/// `address` from several threads at once.
pub trait ChunkHasher: Send + Sync {
    /// Returns the address of `data`.
    fn address(&self, data: &[u8]) -> ChunkAddress;
}

impl<T: ChunkHasher + ?Sized> ChunkHasher for &T {
    fn address(&self, data: &[u8]) -> ChunkAddress {
        (**self).address(data)
    }
}

impl<T: ChunkHasher + ?Sized> ChunkHasher for std::sync::Arc<T> {
    fn address(&self, data: &[u8]) -> ChunkAddress {
        (**self).address(data)
    }
}

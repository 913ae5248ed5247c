//! Hashing utilities.
//!
//! Two families are used:
//!
//! - **Keccak256** (legacy, pre-SHA3 padding) for everything that has to match
//!   other implementations byte-for-byte: addresses, topics, signed-message
//!   digests, and the default chunk address function.
//! - **SHAKE256** with domain separation for the trojan key schedule, keystream
//!   and authentication tag.
//!
//! ## Domain Separation
//!
//! ```text
//! output = SHAKE256(u32_le(len(domain)) || domain || input, output_length)
//! ```
//!
//! Multi-input variants additionally prefix every input with its `u64_le`
//! length so `("ab", "c")` and `("a", "bc")` never collide.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Keccak256, Shake256};

use pss_core::constants::KECCAK256_SIZE;
use pss_core::traits::ChunkHasher;
use pss_core::types::ChunkAddress;

// ═══════════════════════════════════════════════════════════════════════════════
// KECCAK256
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes Keccak256 hash (used for Ethereum addresses and topics).
///
/// Note: Keccak256 is NOT SHA3-256. They use different padding.
pub fn keccak256(input: &[u8]) -> [u8; KECCAK256_SIZE] {
    keccak256_multi(&[input])
}

/// Computes Keccak256 over the plain concatenation of `inputs`.
///
/// No length framing is added; this is for formats that define their own.
pub fn keccak256_multi(inputs: &[&[u8]]) -> [u8; KECCAK256_SIZE] {
    use sha3::Digest;

    let mut hasher = Keccak256::new();
    for input in inputs {
        Digest::update(&mut hasher, input);
    }
    hasher.finalize().into()
}

/// Chunk address function backed by plain Keccak256 over the chunk bytes.
///
/// Networks with a different content hash plug their own [`ChunkHasher`] in.
#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256Hasher;

impl ChunkHasher for Keccak256Hasher {
    fn address(&self, data: &[u8]) -> ChunkAddress {
        ChunkAddress::from_array(keccak256(data))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHAKE256 FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes SHAKE256 hash with domain separation.
///
/// # Arguments
///
/// * `domain` - Domain separator bytes (unique per use case)
/// * `input` - Input data to hash
/// * `output_len` - Desired output length in bytes
pub fn shake256(domain: &[u8], input: &[u8], output_len: usize) -> Vec<u8> {
    let mut hasher = domain_prefixed(domain);
    hasher.update(input);

    let mut reader = hasher.finalize_xof();
    let mut output = vec![0u8; output_len];
    reader.read(&mut output);

    output
}

/// Computes SHAKE256 hash with multiple length-framed inputs.
pub fn shake256_multi(domain: &[u8], inputs: &[&[u8]], output_len: usize) -> Vec<u8> {
    let mut hasher = DomainHasher::new(domain);
    for input in inputs {
        hasher.absorb(input);
    }
    hasher.finalize_vec(output_len)
}

/// Returns a SHAKE256 XOF reader for streaming output.
///
/// Use this when you need to generate a large amount of output
/// incrementally, such as a keystream.
pub fn shake256_xof(domain: &[u8], input: &[u8]) -> Shake256XofReader {
    let mut hasher = domain_prefixed(domain);
    hasher.update(input);

    Shake256XofReader {
        reader: hasher.finalize_xof(),
    }
}

fn domain_prefixed(domain: &[u8]) -> Shake256 {
    let mut hasher = Shake256::default();
    hasher.update(&(domain.len() as u32).to_le_bytes());
    hasher.update(domain);
    hasher
}

/// Streaming reader for SHAKE256 output.
pub struct Shake256XofReader {
    reader: sha3::digest::core_api::XofReaderCoreWrapper<sha3::Shake256ReaderCore>,
}

impl Shake256XofReader {
    /// Reads bytes into the provided buffer.
    pub fn read(&mut self, output: &mut [u8]) {
        self.reader.read(output);
    }

    /// Reads and returns a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut output = [0u8; N];
        self.reader.read(&mut output);
        output
    }

    /// XORs the next `buf.len()` bytes of output into `buf`.
    pub fn xor_into(&mut self, buf: &mut [u8]) {
        let mut block = [0u8; 136];
        for chunk in buf.chunks_mut(block.len()) {
            let stream = &mut block[..chunk.len()];
            self.reader.read(stream);
            for (b, k) in chunk.iter_mut().zip(stream.iter()) {
                *b ^= k;
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INCREMENTAL DOMAIN HASHER
// ═══════════════════════════════════════════════════════════════════════════════

/// Incremental form of [`shake256_multi`].
///
/// The state is `Clone`, so a shared prefix can be absorbed once and then
/// forked per candidate, which is what the mining loop does with the tag.
#[derive(Clone)]
pub struct DomainHasher {
    inner: Shake256,
}

impl DomainHasher {
    /// Starts a hasher bound to `domain`.
    pub fn new(domain: &[u8]) -> Self {
        Self {
            inner: domain_prefixed(domain),
        }
    }

    /// Absorbs one length-framed input.
    pub fn absorb(&mut self, input: &[u8]) -> &mut Self {
        self.inner.update(&(input.len() as u64).to_le_bytes());
        self.inner.update(input);
        self
    }

    /// Finishes and returns a fixed-size output.
    pub fn finalize<const N: usize>(self) -> [u8; N] {
        let mut output = [0u8; N];
        self.inner.finalize_xof().read(&mut output);
        output
    }

    /// Finishes and returns `output_len` bytes.
    pub fn finalize_vec(self, output_len: usize) -> Vec<u8> {
        let mut output = vec![0u8; output_len];
        self.inner.finalize_xof().read(&mut output);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pss_core::constants::*;

    #[test]
    fn test_shake256_variable_output() {
        let short = shake256(b"domain", b"input", 16);
        let long = shake256(b"domain", b"input", 64);

        assert_eq!(short.len(), 16);
        assert_eq!(long.len(), 64);

        // First 16 bytes should match
        assert_eq!(&short[..], &long[..16]);
    }

    #[test]
    fn test_shake256_domain_separation() {
        let domain1 = shake256(b"domain1", b"input", 32);
        let domain2 = shake256(b"domain2", b"input", 32);

        assert_ne!(domain1, domain2);
    }

    #[test]
    fn test_shake256_deterministic() {
        assert_eq!(shake256(b"domain", b"input", 32), shake256(b"domain", b"input", 32));
    }

    #[test]
    fn test_shake256_multi_framing() {
        let multi = shake256_multi(b"domain", &[b"part1", b"part2"], 32);

        // Should be different from concatenated input
        let single = shake256(b"domain", b"part1part2", 32);
        assert_ne!(multi, single);

        // Moving the boundary changes the output
        let shifted = shake256_multi(b"domain", &[b"part", b"1part2"], 32);
        assert_ne!(multi, shifted);
    }

    #[test]
    fn test_domain_hasher_matches_multi() {
        let mut hasher = DomainHasher::new(b"domain");
        hasher.absorb(b"part1").absorb(b"part2");
        let incremental: [u8; 32] = hasher.finalize();

        assert_eq!(incremental.to_vec(), shake256_multi(b"domain", &[b"part1", b"part2"], 32));
    }

    #[test]
    fn test_domain_hasher_fork() {
        let mut prefix = DomainHasher::new(b"domain");
        prefix.absorb(b"shared");

        let mut a = prefix.clone();
        a.absorb(b"a");
        let mut b = prefix.clone();
        b.absorb(b"b");

        let a: [u8; 32] = a.finalize();
        let b: [u8; 32] = b.finalize();
        assert_ne!(a, b);
        assert_eq!(a.to_vec(), shake256_multi(b"domain", &[b"shared", b"a"], 32));
    }

    #[test]
    fn test_shake256_xof() {
        let mut reader = shake256_xof(b"domain", b"input");

        let mut output1 = [0u8; 32];
        let mut output2 = [0u8; 32];

        reader.read(&mut output1);
        reader.read(&mut output2);

        // Sequential reads should produce different data
        assert_ne!(output1, output2);
    }

    #[test]
    fn test_xof_xor_into_matches_read() {
        let mut buf = vec![0u8; 1000];
        shake256_xof(b"domain", b"key").xor_into(&mut buf);

        let mut expected = vec![0u8; 1000];
        shake256_xof(b"domain", b"key").read(&mut expected);
        assert_eq!(buf, expected);

        // Applying twice restores the plaintext
        shake256_xof(b"domain", b"key").xor_into(&mut buf);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_keccak256() {
        let hash = keccak256(b"hello");

        // Known test vector
        let expected = hex::decode(
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        ).unwrap();
        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_keccak256_empty() {
        let expected = hex::decode(
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        ).unwrap();
        assert_eq!(keccak256(b"").as_slice(), expected.as_slice());
    }

    #[test]
    fn test_keccak256_multi_is_concatenation() {
        assert_eq!(keccak256_multi(&[b"hel", b"lo"]), keccak256(b"hello"));
    }

    #[test]
    fn test_keccak_hasher_is_keccak() {
        let addr = Keccak256Hasher.address(b"hello");
        assert_eq!(addr.as_array(), &keccak256(b"hello"));
    }

    #[test]
    fn test_trojan_domains_produce_different_outputs() {
        let input = [0u8; 32];

        let kdf = shake256(DOMAIN_TROJAN_KDF, &input, 32);
        let stream = shake256(DOMAIN_TROJAN_STREAM, &input, 32);
        let mac = shake256(DOMAIN_TROJAN_MAC, &input, 32);

        assert_ne!(kdf, stream);
        assert_ne!(kdf, mac);
        assert_ne!(stream, mac);
    }
}

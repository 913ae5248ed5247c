//! Protocol constants for PSS.
//!
//! Key and signature sizes follow secp256k1 as used by Ethereum-style tooling.
//! The trojan chunk layout is fixed; any change here breaks interoperability.

// ═══════════════════════════════════════════════════════════════════════════════
// SECP256K1 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of an encoded private key: the big-endian scalar, left-padded.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Size of a SEC1 compressed public key (`0x02|0x03 || x`).
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;

/// Size of a SEC1 uncompressed public key (`0x04 || x || y`).
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;

/// Size of a recoverable signature: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_SIZE: usize = 65;

/// Offset added to the recovery id when it is stored in the `v` byte.
pub const SIGNATURE_V_OFFSET: u8 = 27;

/// Size of the raw ECDH shared secret (x-coordinate).
pub const SHARED_SECRET_SIZE: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESSES AND TOPICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of an Ethereum address in bytes (20 bytes = 160 bits).
pub const ETH_ADDRESS_SIZE: usize = 20;

/// Size of a chunk address (output of the chunk hash function).
pub const CHUNK_ADDRESS_SIZE: usize = 32;

/// Size of a topic identifier.
pub const TOPIC_SIZE: usize = 32;

/// Size of keccak256 hash output.
pub const KECCAK256_SIZE: usize = 32;

/// Size of the nonce mixed into overlay address derivation.
pub const OVERLAY_NONCE_SIZE: usize = 32;

/// Prefix used when hashing a message for signing.
pub const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

// ═══════════════════════════════════════════════════════════════════════════════
// TROJAN CHUNK LAYOUT
// ═══════════════════════════════════════════════════════════════════════════════
//
//   nonce (32) || ephemeral_pk (33) || ciphertext (3999) || tag (32) = 4096

/// Total size of a trojan chunk in bytes.
pub const CHUNK_SIZE: usize = 4096;

/// Size of the mined nonce at the start of the chunk.
pub const NONCE_SIZE: usize = 32;

/// Size of the ephemeral public key carried in the chunk.
pub const EPHEMERAL_KEY_SIZE: usize = COMPRESSED_PUBLIC_KEY_SIZE;

/// Size of the authentication tag at the end of the chunk.
pub const TAG_SIZE: usize = 32;

/// Size of the encrypted envelope.
pub const CIPHERTEXT_SIZE: usize = CHUNK_SIZE - NONCE_SIZE - EPHEMERAL_KEY_SIZE - TAG_SIZE;

/// Offset of the ephemeral public key.
pub const EPHEMERAL_KEY_OFFSET: usize = NONCE_SIZE;

/// Offset of the ciphertext.
pub const CIPHERTEXT_OFFSET: usize = EPHEMERAL_KEY_OFFSET + EPHEMERAL_KEY_SIZE;

/// Offset of the authentication tag.
pub const TAG_OFFSET: usize = CIPHERTEXT_OFFSET + CIPHERTEXT_SIZE;

/// Size of the big-endian payload length field in the envelope.
pub const PAYLOAD_LENGTH_SIZE: usize = 2;

/// Bytes of envelope framing that precede the payload.
pub const ENVELOPE_HEADER_SIZE: usize = TOPIC_SIZE + PAYLOAD_LENGTH_SIZE;

/// Largest payload that fits in a single trojan chunk.
pub const MAX_PAYLOAD_SIZE: usize = CIPHERTEXT_SIZE - ENVELOPE_HEADER_SIZE;

/// Longest allowed mining target (a full chunk address).
pub const MAX_TARGET_SIZE: usize = CHUNK_ADDRESS_SIZE;

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN SEPARATORS
// ═══════════════════════════════════════════════════════════════════════════════
// Each SHAKE256 invocation uses a unique domain separator so outputs from
// different operations never collide, even with the same inputs.

/// Domain separator for deriving trojan session keys from the ECDH secret.
pub const DOMAIN_TROJAN_KDF: &[u8] = b"PSS_TROJAN_KDF_V1";

/// Domain separator for the envelope keystream.
pub const DOMAIN_TROJAN_STREAM: &[u8] = b"PSS_TROJAN_STREAM_V1";

/// Domain separator for the chunk authentication tag.
pub const DOMAIN_TROJAN_MAC: &[u8] = b"PSS_TROJAN_MAC_V1";

// ═══════════════════════════════════════════════════════════════════════════════
// MINING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default ceiling on nonce attempts for a single wrap.
///
/// A target of depth `d` needs about `2^(8d)` attempts on average, so the
/// default comfortably covers depths 1 and 2.
pub const DEFAULT_MAX_MINING_ATTEMPTS: u64 = 1 << 24;

/// Default number of mining workers.
pub const DEFAULT_MINING_WORKERS: usize = 1;

/// Upper bound on mining workers. Each worker is an OS thread.
pub const MAX_MINING_WORKERS: usize = 256;

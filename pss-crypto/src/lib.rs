//! # PSS Cryptography
//!
//! secp256k1 primitives for trojan chunk messaging.
//!
//! This crate provides:
//!
//! - **Keys**: Private key generation and the canonical 32-byte key codec
//! - **Sign**: Recoverable ECDSA over Ethereum signed-message digests
//! - **Address**: Ethereum and overlay address derivation
//! - **Topic**: Label to 32-byte topic hashing
//! - **Hash**: Keccak256 and domain-separated SHAKE256
//! - **Session**: ECDH key agreement, key schedule, keystream and tag for trojan envelopes
//!
//! ## Security Properties
//!
//! - Private keys and session keys are zeroized on drop
//! - Signatures use RFC 6979 deterministic nonces and are low-S normalized
//! - Tag checks are constant-time
//! - Domain separators keep KDF, keystream and MAC outputs independent
//!
//! ## Example
//!
//! ```rust,ignore
//! use pss_crypto::{generate_private_key, encode_private_key, decode_private_key};
//! use pss_crypto::{DefaultSigner, Signer, recover};
//!
//! let key = generate_private_key();
//! let encoded = encode_private_key(&key);
//! let decoded = decode_private_key(encoded.as_bytes())?;
//!
//! let signer = DefaultSigner::new(decoded);
//! let signature = signer.sign(b"gimme some bytes")?;
//! assert_eq!(recover(signature.as_bytes(), b"gimme some bytes")?, key.public_key());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod address;
pub mod hash;
pub mod keys;
pub mod session;
pub mod sign;
pub mod topic;

// Re-export main functions at crate root
pub use address::{ethereum_address, overlay_address};
pub use hash::{keccak256, keccak256_multi, shake256, shake256_multi, shake256_xof, DomainHasher, Keccak256Hasher};
pub use keys::{decode_private_key, encode_private_key, generate_private_key, PrivateKey, PublicKey};
pub use session::{EphemeralAgreement, SessionKeys, TagState};
pub use sign::{eth_message_digest, recover, recover_address, DefaultSigner, Signer};
pub use topic::new_topic;

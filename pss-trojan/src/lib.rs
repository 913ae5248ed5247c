//! # PSS Trojan Chunks
//!
//! Hide a message inside an ordinary-looking network chunk that only the
//! recipient can open.
//!
//! This crate provides:
//!
//! - **Wrap**: Encrypt topic + payload to a recipient public key and mine the
//!   chunk address into a target neighbourhood
//! - **Unwrap**: Authenticate and decrypt with the recipient private key,
//!   accepting only listened-to topics
//! - **Mining control**: Attempt budgets, deadlines, cancellation and
//!   multi-threaded search
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pss_core::types::{Target, Targets};
//! use pss_crypto::{generate_private_key, new_topic};
//! use pss_trojan::{unwrap, wrap};
//!
//! let recipient = generate_private_key();
//! let topic = new_topic("chat");
//! let targets = Targets::new(vec![Target::new(vec![0x3a])?]);
//!
//! // Sender
//! let chunk = wrap(&topic, b"hi", &recipient.public_key(), &targets)?;
//! // ... push chunk.as_bytes() to the network at chunk.address()
//!
//! // Recipient
//! let (topic, payload) = unwrap(&recipient, chunk.as_bytes(), &[topic])?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod chunk;
pub mod config;
pub mod envelope;
pub mod mining;
pub mod trojan;


pub use chunk::TrojanChunk;
pub use config::MiningConfig;
pub use envelope::Envelope;
pub use mining::{CancelGuard, CancelToken, NonceSpace};
pub use trojan::{unwrap, unwrap_with_keys, wrap, TrojanCodec};

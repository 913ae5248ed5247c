//! Domain types for PSS.
//!
//! This module provides the byte-level data structures shared by every crate:
//!
//! - [`EncodedKey`]: Canonical 32-byte private key encoding
//! - [`Signature`]: 65-byte recoverable signature
//! - [`EthAddress`] / [`ChunkAddress`]: Account and network addresses
//! - [`Topic`]: 32-byte message topic
//! - [`Target`] / [`Targets`]: Address prefixes for chunk mining

mod keys;
mod signature;
mod address;
mod topic;
mod target;

pub use keys::*;
pub use signature::*;
pub use address::*;
pub use topic::*;
pub use target::*;

//! # PSS Core
//!
//! Core types, errors, and traits for trojan chunk messaging.
//!
//! This crate provides the foundational building blocks used by the other PSS crates:
//!
//! - **Types**: Byte-level domain models for encoded keys, signatures, addresses,
//!   topics, and mining targets
//! - **Errors**: A single error enum shared by every layer
//! - **Constants**: Wire sizes, chunk layout, and domain separators
//! - **Traits**: The [`ChunkHasher`] seam for the network's chunk address function
//!
//! ## Example
//!
//! ```rust
//! use pss_core::{Target, Targets, ChunkAddress};
//!
//! let targets = Targets::new(vec![Target::new(vec![0x00]).unwrap()]);
//! let address = ChunkAddress::from_array([0u8; 32]);
//! assert!(targets.matching(&address).is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{PssError, Result};
pub use traits::*;
pub use types::*;

//! Topic derivation.

use pss_core::types::Topic;

use crate::hash::keccak256;

/// Hashes a UTF-8 label into a 32-byte topic.
pub fn new_topic(label: &str) -> Topic {
    Topic::from_array(keccak256(label.as_bytes()))
}

//! Mining targets.
//!
//! A [`Target`] is an address prefix; a chunk address hits the target when it
//! starts with those bytes. Wrap keeps mining nonces until the chunk address
//! hits one of the [`Targets`], which steers the chunk toward a neighbourhood
//! of the network without naming the recipient.

use serde::{Deserialize, Serialize};

use super::ChunkAddress;
use crate::constants::MAX_TARGET_SIZE;
use crate::error::{PssError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// TARGET
// ═══════════════════════════════════════════════════════════════════════════════

/// An address prefix of 1 to 32 bytes.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Target {
    prefix: Vec<u8>,
}

impl Target {
    /// Creates a target from prefix bytes.
    ///
    /// # Errors
    /// Returns `InvalidTarget` if the prefix is empty or longer than a chunk address.
    pub fn new(prefix: Vec<u8>) -> Result<Self> {
        if prefix.is_empty() {
            return Err(PssError::InvalidTarget("target prefix is empty".into()));
        }
        if prefix.len() > MAX_TARGET_SIZE {
            return Err(PssError::InvalidTarget(format!(
                "target prefix is {} bytes, max {}",
                prefix.len(),
                MAX_TARGET_SIZE
            )));
        }
        Ok(Self { prefix })
    }

    /// Takes the first `depth` bytes of an address as a target.
    pub fn from_address(address: &ChunkAddress, depth: usize) -> Result<Self> {
        if depth > MAX_TARGET_SIZE {
            return Err(PssError::InvalidTarget(format!(
                "depth {} exceeds address size {}",
                depth, MAX_TARGET_SIZE
            )));
        }
        Self::new(address.as_bytes()[..depth].to_vec())
    }

    /// Returns the prefix bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.prefix
    }

    /// Returns the prefix length in bytes.
    pub fn depth(&self) -> usize {
        self.prefix.len()
    }

    /// Returns true if `address` starts with this prefix.
    pub fn matches(&self, address: &ChunkAddress) -> bool {
        address.has_prefix(&self.prefix)
    }

    /// Returns hex-encoded prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.prefix)
    }

    /// Creates from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::new(hex::decode(s)?)
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Target({})", self.to_hex())
    }
}

impl TryFrom<String> for Target {
    type Error = PssError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.to_hex()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TARGET SET
// ═══════════════════════════════════════════════════════════════════════════════

/// An ordered set of targets. Empty means "any address".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Targets(Vec<Target>);

impl Targets {
    /// Creates a target set.
    pub fn new(targets: Vec<Target>) -> Self {
        Self(targets)
    }

    /// A single target covering the neighbourhood of `address` at `depth` bytes.
    pub fn neighbourhood(address: &ChunkAddress, depth: usize) -> Result<Self> {
        Ok(Self(vec![Target::from_address(address, depth)?]))
    }

    /// Returns the first target `address` matches, if any.
    pub fn matching(&self, address: &ChunkAddress) -> Option<&Target> {
        self.0.iter().find(|t| t.matches(address))
    }

    /// Returns true if `address` is acceptable: it matches a target, or the set is empty.
    pub fn accepts(&self, address: &ChunkAddress) -> bool {
        self.0.is_empty() || self.matching(address).is_some()
    }

    /// Returns true if there are no targets.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Shortest prefix length, which dominates the expected mining cost.
    pub fn min_depth(&self) -> Option<usize> {
        self.0.iter().map(Target::depth).min()
    }

    /// Iterates over the targets.
    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.0.iter()
    }
}

impl From<Vec<Target>> for Targets {
    fn from(targets: Vec<Target>) -> Self {
        Self(targets)
    }
}

impl FromIterator<Target> for Targets {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Targets {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

//! Recoverable signatures.
//!
//! Messages are signed in the Ethereum personal-message form:
//!
//! ```text
//! digest    = keccak256("\x19Ethereum Signed Message:\n" || decimal(len(data)) || data)
//! signature = r (32) || s (32) || v (1),   v = recovery_id + 27
//! ```
//!
//! Anyone holding the signature and the message can recover the signer's
//! public key, so the signature bytes are the whole interoperability contract.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};

use pss_core::constants::{ETH_MESSAGE_PREFIX, KECCAK256_SIZE};
use pss_core::error::{PssError, Result};
use pss_core::types::{EthAddress, Signature};

use crate::address::ethereum_address;
use crate::hash::keccak256_multi;
use crate::keys::{PrivateKey, PublicKey};

/// Computes the Ethereum signed-message digest of `data`.
pub fn eth_message_digest(data: &[u8]) -> [u8; KECCAK256_SIZE] {
    let len = data.len().to_string();
    keccak256_multi(&[ETH_MESSAGE_PREFIX.as_bytes(), len.as_bytes(), data])
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Produces recoverable signatures.
pub trait Signer: Send + Sync {
    /// Signs `data` (hashed as an Ethereum signed message).
    fn sign(&self, data: &[u8]) -> Result<Signature>;

    /// Public key matching the signatures this signer produces.
    fn public_key(&self) -> PublicKey;

    /// Ethereum address of [`Signer::public_key`].
    fn ethereum_address(&self) -> EthAddress {
        ethereum_address(&self.public_key())
    }
}

/// Signer backed by an in-memory private key.
#[derive(Debug, Clone)]
pub struct DefaultSigner {
    key: PrivateKey,
}

impl DefaultSigner {
    /// Creates a signer owning `key`.
    pub fn new(key: PrivateKey) -> Self {
        Self { key }
    }
}

impl Signer for DefaultSigner {
    fn sign(&self, data: &[u8]) -> Result<Signature> {
        let digest = eth_message_digest(data);
        let signing_key = SigningKey::from(self.key.secret());

        let (sig, recid) = signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| PssError::SigningError(e.to_string()))?;

        let (r, s) = sig.split_bytes();
        let r: [u8; 32] = r.into();
        let s: [u8; 32] = s.into();
        Signature::from_parts(&r, &s, recid.to_byte())
    }

    fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Recovers the signer's public key from a 65-byte signature and the message.
///
/// High-S signatures from other signers are accepted by normalizing them and
/// flipping the recovery parity.
///
/// # Errors
/// Returns `InvalidSignature` if the signature is not 65 bytes, `v` is not in
/// 27..=30, `r`/`s` are zero or out of range, or no key can be recovered.
pub fn recover(signature: &[u8], data: &[u8]) -> Result<PublicKey> {
    let signature = Signature::from_bytes(signature)?;
    let recovery_byte = signature
        .recovery_id()
        .ok_or_else(|| PssError::InvalidSignature(format!("invalid v value {}", signature.v())))?;

    let mut sig = EcdsaSignature::from_slice(signature.rs())
        .map_err(|_| PssError::InvalidSignature("r or s out of range".into()))?;
    let mut recid = RecoveryId::from_byte(recovery_byte)
        .ok_or_else(|| PssError::InvalidSignature("invalid recovery id".into()))?;

    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recid = RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced());
    }

    let digest = eth_message_digest(data);
    let verifying_key = VerifyingKey::recover_from_prehash(&digest, &sig, recid)
        .map_err(|_| PssError::InvalidSignature("public key recovery failed".into()))?;

    Ok(PublicKey::from(k256::PublicKey::from(&verifying_key)))
}

/// Recovers the signer's Ethereum address.
pub fn recover_address(signature: &[u8], data: &[u8]) -> Result<EthAddress> {
    recover(signature, data).map(|pk| ethereum_address(&pk))
}

//! Trojan session crypto.
//!
//! One session per wrapped chunk:
//!
//! ```text
//! shared    = ECDH(ephemeral_sk, recipient_pk).x
//! okm       = SHAKE256(DOMAIN_TROJAN_KDF; shared, ephemeral_pk, recipient_pk; 64)
//! enc_key   = okm[0..32]
//! auth_key  = okm[32..64]
//!
//! ciphertext = plaintext XOR SHAKE256-XOF(DOMAIN_TROJAN_STREAM; enc_key)
//! tag        = SHAKE256(DOMAIN_TROJAN_MAC; auth_key, ephemeral_pk, ciphertext, nonce; 32)
//! ```
//!
//! The ephemeral secret lives only inside [`EphemeralAgreement::initiate`];
//! every wrap gets fresh keys, so the keystream never needs an IV.

use k256::ecdh::{diffie_hellman, EphemeralSecret};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use pss_core::constants::{
    COMPRESSED_PUBLIC_KEY_SIZE, DOMAIN_TROJAN_KDF, DOMAIN_TROJAN_MAC, DOMAIN_TROJAN_STREAM,
    TAG_SIZE,
};

use crate::hash::{shake256_xof, DomainHasher};
use crate::keys::{PrivateKey, PublicKey};

const SESSION_KEY_SIZE: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Encryption and authentication keys for one trojan chunk. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    enc_key: [u8; SESSION_KEY_SIZE],
    auth_key: [u8; SESSION_KEY_SIZE],
}

impl SessionKeys {
    /// Runs the key schedule over an ECDH shared secret.
    pub fn derive(shared_secret: &[u8], ephemeral: &PublicKey, recipient: &PublicKey) -> Self {
        let mut hasher = DomainHasher::new(DOMAIN_TROJAN_KDF);
        hasher
            .absorb(shared_secret)
            .absorb(&ephemeral.to_compressed())
            .absorb(&recipient.to_compressed());
        let okm: Zeroizing<[u8; 2 * SESSION_KEY_SIZE]> = Zeroizing::new(hasher.finalize());

        let mut enc_key = [0u8; SESSION_KEY_SIZE];
        let mut auth_key = [0u8; SESSION_KEY_SIZE];
        enc_key.copy_from_slice(&okm[..SESSION_KEY_SIZE]);
        auth_key.copy_from_slice(&okm[SESSION_KEY_SIZE..]);

        Self { enc_key, auth_key }
    }

    /// Recipient side: recomputes the session from the chunk's ephemeral key.
    pub fn respond(recipient: &PrivateKey, ephemeral: &PublicKey) -> Self {
        let shared = diffie_hellman(recipient.scalar(), ephemeral.as_k256().as_affine());
        Self::derive(
            shared.raw_secret_bytes().as_slice(),
            ephemeral,
            &recipient.public_key(),
        )
    }

    /// XORs the keystream into `buf`. Encrypts and decrypts.
    pub fn apply_keystream(&self, buf: &mut [u8]) {
        shake256_xof(DOMAIN_TROJAN_STREAM, &self.enc_key).xor_into(buf);
    }

    /// Starts a tag over the parts of the chunk that do not change while mining.
    ///
    /// The returned state has `auth_key` absorbed into a SHAKE256 sponge that
    /// is not zeroized on drop. Keep it no longer than the wrap or unwrap that
    /// needs it.
    pub fn tag_state(&self, ephemeral: &[u8; COMPRESSED_PUBLIC_KEY_SIZE], ciphertext: &[u8]) -> TagState {
        let mut hasher = DomainHasher::new(DOMAIN_TROJAN_MAC);
        hasher.absorb(&self.auth_key).absorb(ephemeral).absorb(ciphertext);
        TagState { prefix: hasher }
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKeys([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TAG
// ═══════════════════════════════════════════════════════════════════════════════

/// Tag hasher with the key, ephemeral key and ciphertext already absorbed.
///
/// Finishing it with a nonce costs one clone plus one small absorb.
///
/// The sponge state is derived from `auth_key` and is not wiped on drop, so
/// it is key material in memory for as long as the value lives.
#[derive(Clone)]
pub struct TagState {
    prefix: DomainHasher,
}

impl TagState {
    /// Computes the tag for `nonce`.
    pub fn tag(&self, nonce: &[u8]) -> [u8; TAG_SIZE] {
        let mut hasher = self.prefix.clone();
        hasher.absorb(nonce);
        hasher.finalize()
    }

    /// Constant-time check of `tag` against the tag for `nonce`.
    pub fn verify(&self, nonce: &[u8], tag: &[u8]) -> bool {
        self.tag(nonce).as_slice().ct_eq(tag).into()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SENDER AGREEMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Sender side of a session: the ephemeral public key plus derived keys.
#[derive(Debug)]
pub struct EphemeralAgreement {
    ephemeral: PublicKey,
    keys: SessionKeys,
}

impl EphemeralAgreement {
    /// Generates an ephemeral key and agrees on a session with `recipient`.
    pub fn initiate(recipient: &PublicKey) -> Self {
        Self::initiate_with_rng(&mut OsRng, recipient)
    }

    /// Same as [`initiate`](Self::initiate) with a caller-provided RNG.
    pub fn initiate_with_rng<R: RngCore + CryptoRng>(rng: &mut R, recipient: &PublicKey) -> Self {
        let secret = EphemeralSecret::random(rng);
        let ephemeral = PublicKey::from(secret.public_key());
        let shared = secret.diffie_hellman(recipient.as_k256());

        let keys = SessionKeys::derive(shared.raw_secret_bytes().as_slice(), &ephemeral, recipient);
        Self { ephemeral, keys }
    }

    /// The ephemeral public key to embed in the chunk.
    pub fn ephemeral_public_key(&self) -> &PublicKey {
        &self.ephemeral
    }

    /// The derived session keys.
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }
}

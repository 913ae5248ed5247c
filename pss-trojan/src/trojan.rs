//! Trojan chunk wrap and unwrap.
//!
//! ## Wrap (sender side)
//!
//! 1. Agree on session keys with the recipient through a fresh ephemeral key
//! 2. Frame topic and payload into an envelope and encrypt it
//! 3. Mine a nonce until the chunk address hits one of the targets
//!
//! ## Unwrap (recipient side)
//!
//! 1. Recompute the session keys from the chunk's ephemeral key
//! 2. Check the tag, decrypt, and parse the envelope
//! 3. Accept the message only if its topic is one the caller listens on
//!
//! Any chunk the key cannot authenticate fails with `AuthenticationFailed`,
//! which is the normal outcome for chunks addressed to someone else.

use rand::rngs::OsRng;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use pss_core::constants::{
    CHUNK_SIZE, CIPHERTEXT_OFFSET, EPHEMERAL_KEY_OFFSET, EPHEMERAL_KEY_SIZE, NONCE_SIZE,
    TAG_OFFSET,
};
use pss_core::error::{PssError, Result};
use pss_core::traits::ChunkHasher;
use pss_core::types::{Targets, Topic};
use pss_crypto::{EphemeralAgreement, Keccak256Hasher, PrivateKey, PublicKey, SessionKeys};

use crate::chunk::{check_size, TrojanChunk};
use crate::config::MiningConfig;
use crate::envelope::{check_payload_size, Envelope};
use crate::mining::{CancelToken, MiningJob};

// ═══════════════════════════════════════════════════════════════════════════════
// CODEC
// ═══════════════════════════════════════════════════════════════════════════════

/// Wraps and unwraps trojan chunks against a chunk hasher.
#[derive(Clone, Debug, Default)]
pub struct TrojanCodec<H = Keccak256Hasher> {
    hasher: H,
    config: MiningConfig,
}

impl TrojanCodec<Keccak256Hasher> {
    /// Creates a codec with the Keccak256 hasher and default mining limits.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: ChunkHasher> TrojanCodec<H> {
    /// Creates a codec for a specific chunk hasher.
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            hasher,
            config: MiningConfig::default(),
        }
    }

    /// Replaces the mining configuration.
    pub fn with_config(mut self, config: MiningConfig) -> Self {
        self.config = config;
        self
    }

    /// The chunk hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// The mining configuration.
    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    /// Wraps `payload` under `topic` for `recipient`, mining toward `targets`.
    ///
    /// # Errors
    /// - `PayloadTooLarge` if the payload does not fit in one chunk
    /// - `ConfigError` if the mining configuration is unusable
    /// - `TargetUnreachable` if the budget or deadline runs out
    pub fn wrap(
        &self,
        topic: &Topic,
        payload: &[u8],
        recipient: &PublicKey,
        targets: &Targets,
    ) -> Result<TrojanChunk> {
        self.wrap_with_cancel(topic, payload, recipient, targets, &CancelToken::new())
    }

    /// Same as [`wrap`](Self::wrap), stopping with `Cancelled` once `cancel` fires.
    #[instrument(
        skip_all,
        fields(topic = %topic, payload_len = payload.len(), targets = targets.len())
    )]
    pub fn wrap_with_cancel(
        &self,
        topic: &Topic,
        payload: &[u8],
        recipient: &PublicKey,
        targets: &Targets,
        cancel: &CancelToken,
    ) -> Result<TrojanChunk> {
        check_payload_size(payload.len())?;
        self.config.validate()?;

        let agreement = EphemeralAgreement::initiate(recipient);
        let ephemeral = agreement.ephemeral_public_key().to_compressed();

        let envelope = Envelope::new(*topic, payload.to_vec())?;
        let mut ciphertext = envelope.encode(&mut OsRng)?;
        agreement.keys().apply_keystream(&mut ciphertext);
        let tag = agreement.keys().tag_state(&ephemeral, &ciphertext);
        drop(agreement);

        let mut template = vec![0u8; CHUNK_SIZE];
        template[EPHEMERAL_KEY_OFFSET..CIPHERTEXT_OFFSET].copy_from_slice(&ephemeral);
        template[CIPHERTEXT_OFFSET..TAG_OFFSET].copy_from_slice(&ciphertext);

        let job = MiningJob {
            hasher: &self.hasher,
            tag: &tag,
            template: &template,
            targets,
        };
        let mined = job.run(&self.config, cancel)?;

        debug!(attempts = mined.attempts, address = %mined.address, "wrapped trojan chunk");
        Ok(TrojanChunk::new(mined.data, mined.address))
    }

    /// Unwraps a chunk with `recipient`'s key. See [`unwrap`].
    pub fn unwrap(
        &self,
        recipient: &PrivateKey,
        chunk: &[u8],
        candidates: &[Topic],
    ) -> Result<(Topic, Vec<u8>)> {
        unwrap(recipient, chunk, candidates)
    }

    /// Tries each key in turn. See [`unwrap_with_keys`].
    pub fn unwrap_with_keys(
        &self,
        keys: &[PrivateKey],
        chunk: &[u8],
        candidates: &[Topic],
    ) -> Result<(usize, Topic, Vec<u8>)> {
        unwrap_with_keys(keys, chunk, candidates)
    }
}

impl<H: ChunkHasher + Clone + 'static> TrojanCodec<H> {
    /// Wraps on the blocking thread pool.
    ///
    /// Dropping the returned future cancels the mining search.
    pub async fn wrap_async(
        &self,
        topic: Topic,
        payload: Vec<u8>,
        recipient: PublicKey,
        targets: Targets,
    ) -> Result<TrojanChunk> {
        let codec = self.clone();
        let cancel = CancelToken::new();
        let _guard = cancel.clone().drop_guard();

        tokio::task::spawn_blocking(move || {
            codec.wrap_with_cancel(&topic, &payload, &recipient, &targets, &cancel)
        })
        .await
        .map_err(|e| PssError::InternalError(format!("mining task failed: {}", e)))?
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FREE FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Wraps with the Keccak256 hasher and default mining limits.
pub fn wrap(
    topic: &Topic,
    payload: &[u8],
    recipient: &PublicKey,
    targets: &Targets,
) -> Result<TrojanChunk> {
    TrojanCodec::new().wrap(topic, payload, recipient, targets)
}

/// Opens a trojan chunk and returns its topic and payload.
///
/// # Errors
/// - `InvalidChunk` if the chunk is not `CHUNK_SIZE` bytes, or decrypts to a
///   malformed envelope
/// - `AuthenticationFailed` if the chunk was not made for this key or was altered
/// - `TopicMismatch` if the topic is not among `candidates`
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub fn unwrap(recipient: &PrivateKey, chunk: &[u8], candidates: &[Topic]) -> Result<(Topic, Vec<u8>)> {
    check_size(chunk.len())?;

    let nonce = &chunk[..NONCE_SIZE];
    let ciphertext = &chunk[CIPHERTEXT_OFFSET..TAG_OFFSET];
    let tag = &chunk[TAG_OFFSET..];

    let mut ephemeral_bytes = [0u8; EPHEMERAL_KEY_SIZE];
    ephemeral_bytes.copy_from_slice(&chunk[EPHEMERAL_KEY_OFFSET..CIPHERTEXT_OFFSET]);
    let ephemeral = PublicKey::from_sec1_bytes(&ephemeral_bytes).map_err(|_| {
        debug!("ephemeral key is not a curve point");
        PssError::AuthenticationFailed
    })?;

    let keys = SessionKeys::respond(recipient, &ephemeral);
    if !keys.tag_state(&ephemeral_bytes, ciphertext).verify(nonce, tag) {
        debug!("tag mismatch");
        return Err(PssError::AuthenticationFailed);
    }

    let mut plaintext = Zeroizing::new(ciphertext.to_vec());
    keys.apply_keystream(&mut plaintext);
    let envelope = Envelope::decode(&plaintext)?;

    if !candidates.contains(&envelope.topic) {
        debug!(topic = %envelope.topic, "topic not among candidates");
        return Err(PssError::TopicMismatch);
    }

    debug!(topic = %envelope.topic, payload_len = envelope.payload.len(), "unwrapped trojan chunk");
    Ok((envelope.topic, envelope.payload))
}

/// Opens a chunk with whichever of `keys` it was made for.
///
/// Returns the index of the key that authenticated the chunk. A key that
/// authenticates but finds an unexpected topic ends the search with
/// `TopicMismatch`; if no key authenticates, the result is `AuthenticationFailed`.
pub fn unwrap_with_keys(
    keys: &[PrivateKey],
    chunk: &[u8],
    candidates: &[Topic],
) -> Result<(usize, Topic, Vec<u8>)> {
    check_size(chunk.len())?;

    for (index, key) in keys.iter().enumerate() {
        match unwrap(key, chunk, candidates) {
            Ok((topic, payload)) => return Ok((index, topic, payload)),
            Err(e) if e.is_not_for_us() => continue,
            Err(e) => return Err(e),
        }
    }
    Err(PssError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pss_core::constants::MAX_PAYLOAD_SIZE;
    use pss_core::types::Target;
    use pss_crypto::{generate_private_key, new_topic};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use test_case::test_case;

    fn depth_one_targets() -> Targets {
        (0u8..4).map(|b| Target::new(vec![b]).unwrap()).collect()
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let key = generate_private_key();
        let topic = new_topic("topic");

        let chunk = wrap(&topic, b"hello", &key.public_key(), &depth_one_targets()).unwrap();
        assert_eq!(chunk.as_bytes().len(), CHUNK_SIZE);
        assert!(depth_one_targets().matching(chunk.address()).is_some());

        let (got_topic, payload) = unwrap(&key, chunk.as_bytes(), &[topic]).unwrap();
        assert_eq!(got_topic, topic);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn test_empty_payload() {
        let key = generate_private_key();
        let topic = new_topic("empty");
        let chunk = wrap(&topic, b"", &key.public_key(), &Targets::default()).unwrap();
        let (_, payload) = unwrap(&key, chunk.as_bytes(), &[topic]).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_max_payload() {
        let key = generate_private_key();
        let topic = new_topic("big");
        let data = vec![0x5A; MAX_PAYLOAD_SIZE];
        let chunk = wrap(&topic, &data, &key.public_key(), &Targets::default()).unwrap();
        let (_, payload) = unwrap(&key, chunk.as_bytes(), &[topic]).unwrap();
        assert_eq!(payload, data);
    }

    #[test]
    fn test_payload_too_large() {
        let key = generate_private_key();
        let err = wrap(
            &new_topic("big"),
            &vec![0; MAX_PAYLOAD_SIZE + 1],
            &key.public_key(),
            &Targets::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PssError::PayloadTooLarge { max: MAX_PAYLOAD_SIZE, .. }));
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let key = generate_private_key();
        let other = generate_private_key();
        let topic = new_topic("topic");
        let chunk = wrap(&topic, b"secret", &key.public_key(), &Targets::default()).unwrap();

        let err = unwrap(&other, chunk.as_bytes(), &[topic]).unwrap_err();
        assert!(matches!(err, PssError::AuthenticationFailed));
        assert!(err.is_not_for_us());
    }

    #[test]
    fn test_wrong_candidates_topic_mismatch() {
        let key = generate_private_key();
        let chunk = wrap(&new_topic("topic"), b"x", &key.public_key(), &Targets::default()).unwrap();

        let err = unwrap(&key, chunk.as_bytes(), &[new_topic("other")]).unwrap_err();
        assert!(matches!(err, PssError::TopicMismatch));

        let err = unwrap(&key, chunk.as_bytes(), &[]).unwrap_err();
        assert!(matches!(err, PssError::TopicMismatch));
    }

    #[test_case(0 ; "nonce")]
    #[test_case(EPHEMERAL_KEY_OFFSET + 5 ; "ephemeral key")]
    #[test_case(CIPHERTEXT_OFFSET ; "ciphertext start")]
    #[test_case(TAG_OFFSET - 1 ; "ciphertext end")]
    #[test_case(CHUNK_SIZE - 1 ; "tag")]
    fn test_tampered_byte_fails_authentication(offset: usize) {
        let key = generate_private_key();
        let topic = new_topic("topic");
        let chunk = wrap(&topic, b"payload", &key.public_key(), &Targets::default()).unwrap();

        let mut bytes = chunk.into_bytes();
        bytes[offset] ^= 0x01;
        assert!(matches!(
            unwrap(&key, &bytes, &[topic]),
            Err(PssError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_unwrap_rejects_wrong_size() {
        let key = generate_private_key();
        assert!(matches!(
            unwrap(&key, &[0u8; 100], &[new_topic("t")]),
            Err(PssError::InvalidChunk(_))
        ));
    }

    #[test]
    fn test_random_chunk_is_not_for_us() {
        let key = generate_private_key();
        let chunk = vec![0u8; CHUNK_SIZE];
        assert!(matches!(
            unwrap(&key, &chunk, &[new_topic("t")]),
            Err(PssError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_unreachable_target_with_tiny_budget() {
        let key = generate_private_key();
        let codec = TrojanCodec::new().with_config(MiningConfig::new().max_attempts(2));
        let deep = Targets::new(vec![Target::new(vec![0xAB; 8]).unwrap()]);

        let err = codec
            .wrap(&new_topic("t"), b"x", &key.public_key(), &deep)
            .unwrap_err();
        assert!(matches!(err, PssError::TargetUnreachable { attempts: 2 }));
    }

    #[test_case(0 ; "no workers")]
    #[test_case(usize::MAX ; "unbounded workers")]
    fn test_invalid_config_rejected(workers: usize) {
        let key = generate_private_key();
        let codec = TrojanCodec::new().with_config(MiningConfig::new().workers(workers));
        let err = codec
            .wrap(&new_topic("t"), b"x", &key.public_key(), &Targets::default())
            .unwrap_err();
        assert!(matches!(err, PssError::ConfigError(_)));
    }

    #[test]
    fn test_cancelled_wrap() {
        let key = generate_private_key();
        let cancel = CancelToken::new();
        cancel.cancel();
        let deep = Targets::new(vec![Target::new(vec![0xAB; 8]).unwrap()]);

        let err = TrojanCodec::new()
            .wrap_with_cancel(&new_topic("t"), b"x", &key.public_key(), &deep, &cancel)
            .unwrap_err();
        assert!(matches!(err, PssError::Cancelled { .. }));
    }

    #[test]
    fn test_timeout_reports_unreachable() {
        let key = generate_private_key();
        let codec = TrojanCodec::new().with_config(
            MiningConfig::new()
                .max_attempts(u64::MAX)
                .timeout(Duration::from_millis(50)),
        );
        let deep = Targets::new(vec![Target::new(vec![0xAB; 8]).unwrap()]);
        let err = codec
            .wrap(&new_topic("t"), b"x", &key.public_key(), &deep)
            .unwrap_err();
        assert!(matches!(err, PssError::TargetUnreachable { .. }));
    }

    #[test]
    fn test_parallel_wrap() {
        let key = generate_private_key();
        let topic = new_topic("parallel");
        let targets = Targets::new(vec![Target::new(vec![0x7F]).unwrap()]);
        let codec = TrojanCodec::new().with_config(MiningConfig::new().workers(4));

        let chunk = codec.wrap(&topic, b"p", &key.public_key(), &targets).unwrap();
        assert_eq!(chunk.address().as_bytes()[0], 0x7F);
        assert!(chunk.verify_address(codec.hasher()));
        assert_eq!(codec.unwrap(&key, chunk.as_bytes(), &[topic]).unwrap().1, b"p");
    }

    #[test]
    fn test_unwrap_with_keys_finds_index() {
        let keys: Vec<_> = (0..3).map(|_| generate_private_key()).collect();
        let topic = new_topic("topic");
        let chunk = wrap(&topic, b"multi", &keys[2].public_key(), &Targets::default()).unwrap();

        let (index, got, payload) = unwrap_with_keys(&keys, chunk.as_bytes(), &[topic]).unwrap();
        assert_eq!(index, 2);
        assert_eq!(got, topic);
        assert_eq!(payload, b"multi");
    }

    #[test]
    fn test_unwrap_with_keys_no_match() {
        let keys: Vec<_> = (0..2).map(|_| generate_private_key()).collect();
        let stranger = generate_private_key();
        let topic = new_topic("topic");
        let chunk = wrap(&topic, b"x", &stranger.public_key(), &Targets::default()).unwrap();

        assert!(matches!(
            unwrap_with_keys(&keys, chunk.as_bytes(), &[topic]),
            Err(PssError::AuthenticationFailed)
        ));
        assert!(matches!(
            unwrap_with_keys(&[], chunk.as_bytes(), &[topic]),
            Err(PssError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_unwrap_with_keys_topic_mismatch_stops() {
        let keys: Vec<_> = (0..2).map(|_| generate_private_key()).collect();
        let chunk = wrap(&new_topic("topic"), b"x", &keys[0].public_key(), &Targets::default()).unwrap();

        assert!(matches!(
            unwrap_with_keys(&keys, chunk.as_bytes(), &[new_topic("other")]),
            Err(PssError::TopicMismatch)
        ));
    }

    #[test]
    fn test_two_wraps_differ() {
        let key = generate_private_key();
        let topic = new_topic("topic");
        let a = wrap(&topic, b"same", &key.public_key(), &Targets::default()).unwrap();
        let b = wrap(&topic, b"same", &key.public_key(), &Targets::default()).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.ephemeral_public_key().unwrap(), b.ephemeral_public_key().unwrap());
    }

    #[tokio::test]
    async fn test_wrap_async() {
        let key = generate_private_key();
        let topic = new_topic("async");
        let chunk = TrojanCodec::new()
            .wrap_async(topic, b"later".to_vec(), key.public_key(), depth_one_targets())
            .await
            .unwrap();
        assert_eq!(unwrap(&key, chunk.as_bytes(), &[topic]).unwrap().1, b"later");
    }

    #[derive(Clone, Default)]
    struct CountingHasher {
        calls: Arc<AtomicU64>,
    }

    impl ChunkHasher for CountingHasher {
        fn address(&self, data: &[u8]) -> pss_core::types::ChunkAddress {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Keccak256Hasher.address(data)
        }
    }

    #[tokio::test]
    async fn test_wrap_async_cancelled_on_drop() {
        let key = generate_private_key();
        let hasher = CountingHasher::default();
        let codec = TrojanCodec::with_hasher(hasher.clone())
            .with_config(MiningConfig::new().max_attempts(u64::MAX));
        let deep = Targets::new(vec![Target::new(vec![0xAB; 16]).unwrap()]);

        let fut = codec.wrap_async(new_topic("t"), b"x".to_vec(), key.public_key(), deep);
        let timed = tokio::time::timeout(Duration::from_millis(50), fut).await;
        assert!(timed.is_err());

        // The search must go quiet once the future is gone
        let mut stopped = false;
        for _ in 0..100 {
            let before = hasher.calls.load(Ordering::Relaxed);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if hasher.calls.load(Ordering::Relaxed) == before {
                stopped = true;
                break;
            }
        }
        assert!(stopped, "mining kept running after the future was dropped");
    }
}

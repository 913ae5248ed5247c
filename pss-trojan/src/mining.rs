//! Nonce mining.
//!
//! Wrap produces a chunk whose content address must land on one of the
//! caller's targets. The only free field is the 32-byte nonce, so the search
//! walks a [`NonceSpace`], recomputes the tag and the address for each nonce,
//! and stops at the first hit.
//!
//! ## Bounds
//!
//! - **Attempts**: the nonce space is exactly `max_attempts` long
//! - **Deadline**: optional wall-clock limit, checked every few hundred attempts
//! - **Cancellation**: a [`CancelToken`] the caller can fire from anywhere
//!
//! With more than one worker the space is split into disjoint ranges searched
//! on scoped threads. The first worker to hit sets a shared flag and the rest
//! stop at their next iteration.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, instrument, warn};

use pss_core::constants::{MAX_MINING_WORKERS, NONCE_SIZE, TAG_OFFSET};
use pss_core::error::{PssError, Result};
use pss_core::traits::ChunkHasher;
use pss_core::types::{ChunkAddress, Targets};
use pss_crypto::TagState;

use crate::config::MiningConfig;

const DEADLINE_CHECK_INTERVAL: u64 = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// CANCELLATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared flag that stops an in-flight mining search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the token. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Returns a guard that fires the token when dropped.
    pub fn drop_guard(self) -> CancelGuard {
        CancelGuard { token: self }
    }
}

/// Fires its token on drop.
#[derive(Debug)]
pub struct CancelGuard {
    token: CancelToken,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NONCE SPACE
// ═══════════════════════════════════════════════════════════════════════════════

/// A bounded, lazily generated range of candidate nonces.
///
/// Nonces share a random 32-byte base; the first 8 bytes hold a little-endian
/// counter offset from the base's own first 8 bytes. Distinct positions give
/// distinct nonces as long as the range is below `2^64`.
#[derive(Clone, Debug)]
pub struct NonceSpace {
    base: [u8; NONCE_SIZE],
    base_counter: u64,
    next: u64,
    end: u64,
}

impl NonceSpace {
    /// A space of `len` nonces around a random base.
    pub fn random(len: u64) -> Self {
        let mut base = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut base);
        Self::with_base(base, len)
    }

    /// A space of `len` nonces around `base`.
    pub fn with_base(base: [u8; NONCE_SIZE], len: u64) -> Self {
        let mut counter = [0u8; 8];
        counter.copy_from_slice(&base[..8]);
        Self {
            base,
            base_counter: u64::from_le_bytes(counter),
            next: 0,
            end: len,
        }
    }

    /// Nonces not yet produced.
    pub fn remaining(&self) -> u64 {
        self.end - self.next
    }

    /// Splits the remaining range into up to `parts` disjoint, contiguous shards.
    ///
    /// Shards differ in length by at most one. `parts` is clamped to the number
    /// of remaining nonces, so fewer than `parts` come back when the range is small.
    pub fn split(self, parts: usize) -> Vec<NonceSpace> {
        let total = self.remaining();
        let parts = u64::try_from(parts).unwrap_or(u64::MAX).clamp(1, total.max(1));
        let per = total / parts;
        let extra = total % parts;

        let mut shards = Vec::with_capacity(parts.min(MAX_MINING_WORKERS as u64) as usize);
        let mut start = self.next;
        for i in 0..parts {
            let len = per + u64::from(i < extra);
            if len == 0 {
                continue;
            }
            shards.push(NonceSpace {
                base: self.base,
                base_counter: self.base_counter,
                next: start,
                end: start + len,
            });
            start += len;
        }
        shards
    }

    fn nonce_at(&self, position: u64) -> [u8; NONCE_SIZE] {
        let mut nonce = self.base;
        let counter = self.base_counter.wrapping_add(position);
        nonce[..8].copy_from_slice(&counter.to_le_bytes());
        nonce
    }
}

impl Iterator for NonceSpace {
    type Item = [u8; NONCE_SIZE];

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let nonce = self.nonce_at(self.next);
        self.next += 1;
        Some(nonce)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MINING JOB
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything fixed for one wrap; only nonce and tag change per attempt.
pub(crate) struct MiningJob<'a, H> {
    pub hasher: &'a H,
    pub tag: &'a TagState,
    /// Full chunk with nonce and tag left zeroed.
    pub template: &'a [u8],
    pub targets: &'a Targets,
}

/// A chunk whose address hit a target.
pub(crate) struct Mined {
    pub data: Vec<u8>,
    pub address: ChunkAddress,
    pub attempts: u64,
}

enum ShardExit {
    Found { data: Vec<u8>, address: ChunkAddress },
    Exhausted,
    TimedOut,
    Cancelled,
    Stopped,
}

impl ShardExit {
    fn label(&self) -> &'static str {
        match self {
            ShardExit::Found { .. } => "found",
            ShardExit::Exhausted => "exhausted",
            ShardExit::TimedOut => "timed_out",
            ShardExit::Cancelled => "cancelled",
            ShardExit::Stopped => "stopped",
        }
    }
}

struct ShardContext<'a> {
    found: &'a AtomicBool,
    attempts: &'a AtomicU64,
    cancel: &'a CancelToken,
    deadline: Option<Instant>,
}

impl<'a, H: ChunkHasher> MiningJob<'a, H> {
    /// Searches for a nonce within the budget of `config`.
    #[instrument(
        skip_all,
        fields(
            workers = config.workers,
            max_attempts = config.max_attempts,
            targets = self.targets.len(),
            min_depth = self.targets.min_depth().unwrap_or(0),
        )
    )]
    pub fn run(&self, config: &MiningConfig, cancel: &CancelToken) -> Result<Mined> {
        let started = Instant::now();
        let deadline = config.timeout.and_then(|t| started.checked_add(t));

        let found = AtomicBool::new(false);
        let attempts = AtomicU64::new(0);
        let ctx = ShardContext {
            found: &found,
            attempts: &attempts,
            cancel,
            deadline,
        };

        let shards = NonceSpace::random(config.max_attempts).split(config.workers);
        debug!(shards = shards.len(), "mining started");

        let exits = if shards.len() <= 1 {
            shards
                .into_iter()
                .map(|space| self.search(space, &ctx))
                .collect::<Vec<_>>()
        } else {
            std::thread::scope(|scope| {
                let ctx = &ctx;
                let handles: Vec<_> = shards
                    .into_iter()
                    .map(|space| scope.spawn(move || self.search(space, ctx)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .map_err(|_| PssError::InternalError("mining worker panicked".into()))
                    })
                    .collect::<Result<Vec<_>>>()
            })?
        };

        let total = attempts.load(Ordering::Relaxed);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let mut cancelled = false;

        for exit in exits {
            match exit {
                ShardExit::Found { data, address } => {
                    info!(attempts = total, elapsed_ms, address = %address, "mined trojan chunk");
                    return Ok(Mined {
                        data,
                        address,
                        attempts: total,
                    });
                }
                ShardExit::Cancelled => cancelled = true,
                _ => {}
            }
        }

        if cancelled {
            debug!(attempts = total, elapsed_ms, "mining cancelled");
            return Err(PssError::Cancelled { attempts: total });
        }

        warn!(attempts = total, elapsed_ms, "mining exhausted its budget without hitting a target");
        Err(PssError::TargetUnreachable { attempts: total })
    }

    fn search(&self, mut space: NonceSpace, ctx: &ShardContext<'_>) -> ShardExit {
        let mut buf = self.template.to_vec();
        let mut local = 0u64;

        let exit = loop {
            if ctx.found.load(Ordering::Relaxed) {
                break ShardExit::Stopped;
            }
            if ctx.cancel.is_cancelled() {
                break ShardExit::Cancelled;
            }
            if local % DEADLINE_CHECK_INTERVAL == 0
                && ctx.deadline.is_some_and(|d| Instant::now() >= d)
            {
                break ShardExit::TimedOut;
            }
            let Some(nonce) = space.next() else {
                break ShardExit::Exhausted;
            };
            local += 1;

            buf[..NONCE_SIZE].copy_from_slice(&nonce);
            let tag = self.tag.tag(&nonce);
            buf[TAG_OFFSET..].copy_from_slice(&tag);

            let address = self.hasher.address(&buf);
            if self.targets.accepts(&address) {
                ctx.found.store(true, Ordering::Relaxed);
                break ShardExit::Found { data: buf, address };
            }
        };

        ctx.attempts.fetch_add(local, Ordering::Relaxed);
        debug!(attempts = local, exit = exit.label(), "mining shard finished");
        exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    use pss_core::constants::CHUNK_SIZE;
    use pss_core::types::Target;
    use pss_crypto::{generate_private_key, EphemeralAgreement, Keccak256Hasher};
    use test_case::test_case;

    /// Hasher whose address is the chunk's first byte repeated, so targets are
    /// hit or missed deterministically by nonce.
    struct FirstByteHasher;

    impl ChunkHasher for FirstByteHasher {
        fn address(&self, data: &[u8]) -> ChunkAddress {
            ChunkAddress::from_array([data[0]; 32])
        }
    }

    fn tag_state() -> TagState {
        let recipient = generate_private_key().public_key();
        let agreement = EphemeralAgreement::initiate(&recipient);
        let eph = agreement.ephemeral_public_key().to_compressed();
        agreement.keys().tag_state(&eph, b"ciphertext")
    }

    fn targets(prefixes: &[&[u8]]) -> Targets {
        prefixes.iter().map(|p| Target::new(p.to_vec()).unwrap()).collect()
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_cancel_guard_fires_on_drop() {
        let token = CancelToken::new();
        {
            let _guard = token.clone().drop_guard();
            assert!(!token.is_cancelled());
        }
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_nonce_space_is_bounded_and_distinct() {
        let space = NonceSpace::random(1000);
        let nonces: HashSet<_> = space.collect();
        assert_eq!(nonces.len(), 1000);
    }

    #[test]
    fn test_nonce_space_counter_layout() {
        let mut base = [0xAAu8; 32];
        base[..8].copy_from_slice(&5u64.to_le_bytes());
        let nonces: Vec<_> = NonceSpace::with_base(base, 3).collect();

        assert_eq!(nonces.len(), 3);
        assert_eq!(&nonces[0][..8], &5u64.to_le_bytes());
        assert_eq!(&nonces[2][..8], &7u64.to_le_bytes());
        assert!(nonces.iter().all(|n| n[8..] == base[8..]));
    }

    #[test]
    fn test_nonce_space_counter_wraps() {
        let mut base = [0u8; 32];
        base[..8].copy_from_slice(&u64::MAX.to_le_bytes());
        let nonces: Vec<_> = NonceSpace::with_base(base, 2).collect();
        assert_eq!(&nonces[1][..8], &0u64.to_le_bytes());
    }

    #[test_case(10, 1 ; "single shard")]
    #[test_case(10, 3 ; "uneven")]
    #[test_case(12, 4 ; "even")]
    #[test_case(2, 5 ; "more parts than nonces")]
    #[test_case(3, usize::MAX ; "unbounded parts")]
    fn test_split_is_disjoint_cover(len: u64, parts: usize) {
        let space = NonceSpace::random(len);
        let all: HashSet<_> = space.clone().collect();
        let shards = space.split(parts);

        assert!(shards.len() <= parts);
        let total: u64 = shards.iter().map(NonceSpace::remaining).sum();
        assert_eq!(total, len);

        let mut seen = HashSet::new();
        for shard in shards {
            for nonce in shard {
                assert!(seen.insert(nonce), "shards overlap");
            }
        }
        assert_eq!(seen, all);
    }

    #[test]
    fn test_split_empty_space() {
        let shards = NonceSpace::random(0).split(usize::MAX);
        assert!(shards.is_empty());
    }

    #[test]
    fn test_run_hits_target() {
        let tag = tag_state();
        let template = vec![0u8; CHUNK_SIZE];
        let targets = targets(&[&[0x00], &[0x01]]);
        let job = MiningJob {
            hasher: &Keccak256Hasher,
            tag: &tag,
            template: &template,
            targets: &targets,
        };

        let mined = job.run(&MiningConfig::default(), &CancelToken::new()).unwrap();
        assert!(targets.accepts(&mined.address));
        assert_eq!(Keccak256Hasher.address(&mined.data), mined.address);
        assert!(mined.attempts >= 1);
        assert_eq!(&mined.data[TAG_OFFSET..], &tag.tag(&mined.data[..NONCE_SIZE]));
    }

    #[test]
    fn test_run_empty_targets_takes_first() {
        let tag = tag_state();
        let template = vec![0u8; CHUNK_SIZE];
        let targets = Targets::default();
        let job = MiningJob {
            hasher: &Keccak256Hasher,
            tag: &tag,
            template: &template,
            targets: &targets,
        };

        let mined = job.run(&MiningConfig::default(), &CancelToken::new()).unwrap();
        assert_eq!(mined.attempts, 1);
    }

    #[test_case(1 ; "one worker")]
    #[test_case(4 ; "four workers")]
    fn test_run_unreachable(workers: usize) {
        let tag = tag_state();
        let template = vec![0u8; CHUNK_SIZE];
        // Address is the first nonce byte repeated; 32 x 0xFF then 0x00 cannot both hold
        let mut impossible = vec![0xFFu8; 31];
        impossible.push(0x00);
        let targets = targets(&[&impossible]);
        let job = MiningJob {
            hasher: &FirstByteHasher,
            tag: &tag,
            template: &template,
            targets: &targets,
        };

        let config = MiningConfig::new().max_attempts(64).workers(workers);
        let err = job.run(&config, &CancelToken::new()).err().unwrap();
        assert!(matches!(err, PssError::TargetUnreachable { attempts: 64 }));
    }

    #[test]
    fn test_run_cancelled_before_start() {
        let tag = tag_state();
        let template = vec![0u8; CHUNK_SIZE];
        let targets = targets(&[&[0xFF, 0x00]]);
        let job = MiningJob {
            hasher: &FirstByteHasher,
            tag: &tag,
            template: &template,
            targets: &targets,
        };

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = job.run(&MiningConfig::default(), &cancel).err().unwrap();
        assert!(matches!(err, PssError::Cancelled { attempts: 0 }));
    }

    #[test]
    fn test_run_zero_timeout() {
        let tag = tag_state();
        let template = vec![0u8; CHUNK_SIZE];
        let targets = targets(&[&[0xFF, 0x00]]);
        let job = MiningJob {
            hasher: &FirstByteHasher,
            tag: &tag,
            template: &template,
            targets: &targets,
        };

        let config = MiningConfig::new().timeout(Duration::ZERO);
        let err = job.run(&config, &CancelToken::new()).err().unwrap();
        assert!(matches!(err, PssError::TargetUnreachable { attempts: 0 }));
    }

    #[test]
    fn test_run_parallel_hits_target() {
        let tag = tag_state();
        let template = vec![0u8; CHUNK_SIZE];
        let targets = targets(&[&[0x42]]);
        let job = MiningJob {
            hasher: &Keccak256Hasher,
            tag: &tag,
            template: &template,
            targets: &targets,
        };

        let mined = job
            .run(&MiningConfig::new().workers(4), &CancelToken::new())
            .unwrap();
        assert_eq!(mined.address.as_bytes()[0], 0x42);
    }
}

//! State Hashing for Desync Detection
//!
//! Every frame's checksum is SHA-256 over the frame number, the RNG
//! state and the entities, folded to a `u64`. Peers compare checksums to
//! spot a desync, and snapshots carry one so a corrupted snapshot is
//! rejected before it is loaded.

use sha2::{Digest, Sha256};

use super::fixed::Fixed;
use super::rng::RandomState;
use super::vec2::FixedVec2;

/// Full SHA-256 digest.
pub type StateHash = [u8; 32];

/// Per-frame checksum exchanged with peers: the first 8 digest bytes,
/// little-endian.
pub type Checksum = u64;

/// Domain tag for frame-state checksums.
const FRAME_STATE_DOMAIN: &[u8] = b"LOCKSTEP_STATE_V1";

/// Incremental SHA-256 over simulation values.
///
/// Integers are fed little-endian. Callers must feed fields in a fixed
/// order; the digest depends on it.
pub struct StateHasher {
    digest: Sha256,
}

impl StateHasher {
    /// Start a digest tagged with `domain`.
    pub fn new(domain: &[u8]) -> Self {
        let mut digest = Sha256::new();
        digest.update(domain);
        Self { digest }
    }

    /// Start a frame-state digest.
    pub fn for_frame_state() -> Self {
        Self::new(FRAME_STATE_DOMAIN)
    }

    /// Raw bytes, as given.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.digest.update(bytes);
    }

    /// One byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.update_bytes(&[value]);
    }

    /// Little-endian u32.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.update_bytes(&value.to_le_bytes());
    }

    /// Little-endian u64.
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.update_bytes(&value.to_le_bytes());
    }

    /// Little-endian i32.
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.update_bytes(&value.to_le_bytes());
    }

    /// `0` or `1` as one byte.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(u8::from(value));
    }

    /// Raw Q16.16 bits, same encoding as [`Self::update_i32`].
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.update_i32(value);
    }

    /// `x` then `y`.
    #[inline]
    pub fn update_vec2(&mut self, value: FixedVec2) {
        self.update_fixed(value.x);
        self.update_fixed(value.y);
    }

    /// Full digest.
    pub fn finalize(self) -> StateHash {
        self.digest.finalize().into()
    }

    /// Digest folded to a [`Checksum`].
    pub fn finalize_checksum(self) -> Checksum {
        checksum_from_hash(&self.finalize())
    }
}

/// Fold a digest into a [`Checksum`].
pub fn checksum_from_hash(hash: &StateHash) -> Checksum {
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(head)
}

/// Compute the frame checksum.
///
/// Frame, seed and cursor are always hashed first; the closure adds the
/// entity state in its canonical order.
pub fn compute_checksum<F>(frame: u32, random_state: &RandomState, add_state: F) -> Checksum
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_frame_state();

    hasher.update_u32(frame);
    hasher.update_u64(random_state.seed);
    hasher.update_u64(random_state.cursor);

    add_state(&mut hasher);

    hasher.finalize_checksum()
}

// =============================================================================
// TESTS
// =============================================================================

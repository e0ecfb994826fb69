//! Deterministic Random Number Generator
//!
//! Counter-based SplitMix64: output `n` is a pure function of `(seed, n)`.
//! The whole generator state is the two integers in [`RandomState`], so
//! saving, loading and rewinding are plain copies.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::{SimError, SimResult};
use super::fixed::Fixed;

/// SplitMix64 increment (golden ratio).
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Serializable generator state.
///
/// `cursor` counts the draws taken since construction (or the last reset).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RandomState {
    /// Root seed
    pub seed: u64,
    /// Number of draws taken
    pub cursor: u64,
}

/// Deterministic PRNG shared identically by all peers.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG produces the exact same sequence on any
/// platform. No wall clock or hardware entropy is ever consulted.
///
/// # Example
///
/// ```
/// use lockstep_core::core::rng::DeterministicRandom;
///
/// let mut rng = DeterministicRandom::new(42);
/// let value = rng.next_u64();
/// assert_eq!(value, 13679457532755275413); // Always the same!
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeterministicRandom {
    state: RandomState,
}

impl Default for DeterministicRandom {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRandom {
    /// Create a new RNG from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: RandomState { seed, cursor: 0 },
        }
    }

    /// Root seed this generator was built from.
    pub fn seed(&self) -> u64 {
        self.state.seed
    }

    /// Number of draws taken so far.
    pub fn cursor(&self) -> u64 {
        self.state.cursor
    }

    /// Generate the next 64-bit random value. Advances the cursor by one.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let value = output_at(self.state.seed, self.state.cursor);
        self.state.cursor = self.state.cursor.wrapping_add(1);
        value
    }

    /// Generate a float in `[0, 1)`.
    ///
    /// Uses the top 53 bits, so the conversion is exact on every platform.
    /// Boundary use only; the frame step draws with [`Self::next_fixed`].
    #[inline]
    pub fn next_float(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
        (self.next_u64() >> 11) as f64 * SCALE
    }

    /// Generate a Fixed in `[0, 1.0)`.
    #[inline]
    pub fn next_fixed(&mut self) -> Fixed {
        (self.next_u64() >> 48) as Fixed
    }

    /// Generate a random integer in `[min, max)`.
    ///
    /// # Errors
    /// [`SimError::InvalidRange`] when `min >= max`. No draw is taken.
    #[inline]
    pub fn next_int(&mut self, min: i32, max: i32) -> SimResult<i32> {
        if min >= max {
            return Err(SimError::InvalidRange {
                min: min as i64,
                max: max as i64,
            });
        }
        let offset = self.next_offset((max as i64 - min as i64) as u64);
        Ok((min as i64 + offset as i64) as i32)
    }

    /// Generate a random Fixed in `[min, max)`.
    ///
    /// # Errors
    /// [`SimError::InvalidRange`] when `min >= max`. No draw is taken.
    #[inline]
    pub fn next_fixed_range(&mut self, min: Fixed, max: Fixed) -> SimResult<Fixed> {
        self.next_int(min, max)
    }

    /// Multiply-shift reduction of the top 32 bits into `[0, range)`.
    #[inline]
    fn next_offset(&mut self, range: u64) -> u64 {
        let raw = self.next_u64() >> 32;
        (raw * range) >> 32
    }

    /// Copy of the current state.
    pub fn save(&self) -> RandomState {
        self.state
    }

    /// Restore from a saved state.
    pub fn load(&mut self, state: RandomState) {
        self.state = state;
    }

    /// Rewind to the first draw of the current seed.
    pub fn reset(&mut self) {
        self.state.cursor = 0;
    }
}

/// SplitMix64 output for draw number `index`.
#[inline]
fn output_at(seed: u64, index: u64) -> u64 {
    let z = seed.wrapping_add(index.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA));
    splitmix64_mix(z)
}

/// SplitMix64 finalizer.
#[inline]
fn splitmix64_mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derive a match seed from match parameters.
///
/// # Parameters
///
/// - `match_id`: Unique match identifier
/// - `player_ids`: All player IDs (MUST be sorted for determinism)
pub fn derive_match_seed(match_id: &[u8; 16], player_ids: &[[u8; 16]]) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"LOCKSTEP_SEED_V1");
    hasher.update(match_id);
    for pid in player_ids {
        hasher.update(pid);
    }

    let hash = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================

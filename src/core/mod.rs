//! Core deterministic primitives.
//!
//! All types in this module are designed for perfect cross-platform determinism.
//! They form the numeric substrate every frame step builds on.

pub mod error;
pub mod fixed;
pub mod hash;
pub mod rng;
pub mod vec2;

// Re-export core types
pub use error::{SimError, SimResult};
pub use fixed::{Fixed, FixedNum, FIXED_HALF, FIXED_ONE, FIXED_SCALE};
pub use hash::{compute_checksum, Checksum, StateHasher};
pub use rng::{DeterministicRandom, RandomState};
pub use vec2::FixedVec2;

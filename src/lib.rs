//! # Lockstep Core
//!
//! Deterministic fixed-point simulation core for lockstep and rollback
//! netcode.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       LOCKSTEP CORE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rng.rs      - Counter-based SplitMix64 random           │
//! │  ├── hash.rs     - State hashing and checksums               │
//! │  └── error.rs    - Error types                               │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Per-frame player input                    │
//! │  ├── state.rs    - Player ids and entity records             │
//! │  ├── config.rs   - Tuning and frame timing                   │
//! │  ├── snapshot.rs - Save/load snapshots                       │
//! │  ├── sim.rs      - DeterministicGame orchestrator            │
//! │  └── rollback.rs - Rollback sessions and replay              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in the frame step
//! - No HashMap (uses BTreeMap and sorted Vecs for iteration)
//! - No system time dependencies
//! - All randomness from the game's own seeded generator
//!
//! Given the same seed, config and per-frame inputs, every peer computes
//! the same checksum at every frame, and
//! `load_state(save_state())` followed by `update` produces the same
//! result as an uninterrupted run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::error::{SimError, SimResult};
pub use crate::core::fixed::{Fixed, FixedNum, FIXED_HALF, FIXED_ONE, FIXED_SCALE};
pub use crate::core::hash::Checksum;
pub use crate::core::rng::{DeterministicRandom, RandomState};
pub use crate::core::vec2::FixedVec2;
pub use crate::game::config::{GameConfig, FRAME_RATE, TICK_DT};
pub use crate::game::input::PlayerInput;
pub use crate::game::rollback::{replay, RollbackSession};
pub use crate::game::sim::DeterministicGame;
pub use crate::game::snapshot::StateSnapshot;
pub use crate::game::state::{EntityRecord, GameView, PlayerId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Game Logic Module
//!
//! Frame-stepped simulation on top of `core`. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Per-frame player input and axis normalization
//! - `state`: Player ids, entity records, read-only views
//! - `config`: Tuning parameters and frame timing
//! - `snapshot`: Owned state snapshots and their checksums
//! - `sim`: The `DeterministicGame` orchestrator
//! - `rollback`: Snapshot ring, input history, rollback sessions, replay

pub mod config;
pub mod input;
pub mod rollback;
pub mod sim;
pub mod snapshot;
pub mod state;

// Re-export key types
pub use config::{GameConfig, FRAME_RATE, TICK_DT};
pub use input::PlayerInput;
pub use rollback::{first_divergence, replay, FrameInputs, InputHistory, RollbackSession, SnapshotRing};
pub use sim::DeterministicGame;
pub use snapshot::StateSnapshot;
pub use state::{EntityRecord, GameView, PlayerId};

//! Rollback Tooling
//!
//! Helpers for the layer that drives [`DeterministicGame`] under rollback
//! netcode: a bounded history of snapshots, the input history those
//! frames were simulated with, a session that rewinds and resimulates when
//! a remote input is corrected, and a from-scratch replay for desync triage.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::core::error::{SimError, SimResult};
use crate::core::hash::Checksum;
use crate::game::config::GameConfig;
use crate::game::input::PlayerInput;
use crate::game::sim::DeterministicGame;
use crate::game::snapshot::StateSnapshot;
use crate::game::state::PlayerId;

/// Inputs for every player on one frame.
pub type FrameInputs = BTreeMap<PlayerId, PlayerInput>;

/// Default number of frames a session can rewind (8 frames ≈ 133 ms at 60 Hz)
pub const DEFAULT_ROLLBACK_WINDOW: usize = 8;

// =============================================================================
// SNAPSHOT RING
// =============================================================================

/// Fixed-capacity history of snapshots in ascending frame order.
#[derive(Clone, Debug)]
pub struct SnapshotRing {
    capacity: usize,
    snapshots: VecDeque<StateSnapshot>,
}

impl SnapshotRing {
    /// Create a ring holding at most `capacity` snapshots (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            snapshots: VecDeque::with_capacity(capacity),
        }
    }

    /// Store a snapshot.
    ///
    /// Snapshots at or after its frame are dropped first; they belong to a
    /// timeline that no longer exists. The oldest entry is evicted when full.
    pub fn push(&mut self, snapshot: StateSnapshot) {
        while self
            .snapshots
            .back()
            .is_some_and(|s| s.frame() >= snapshot.frame())
        {
            self.snapshots.pop_back();
        }
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
    }

    /// Snapshot taken at `frame`, if still held.
    pub fn get(&self, frame: u32) -> Option<&StateSnapshot> {
        self.snapshots
            .binary_search_by(|s| s.frame().cmp(&frame))
            .ok()
            .map(|idx| &self.snapshots[idx])
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> Option<&StateSnapshot> {
        self.snapshots.back()
    }

    /// Oldest frame still held.
    pub fn oldest_frame(&self) -> Option<u32> {
        self.snapshots.front().map(StateSnapshot::frame)
    }

    /// Drop every snapshot newer than `frame`.
    pub fn discard_after(&mut self, frame: u32) {
        while self.snapshots.back().is_some_and(|s| s.frame() > frame) {
            self.snapshots.pop_back();
        }
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if no snapshots are held.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum number of snapshots held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all snapshots.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

// =============================================================================
// INPUT HISTORY
// =============================================================================

/// Inputs each simulated frame was advanced with.
///
/// Entries may be predictions; [`InputHistory::correct`] replaces one
/// player's input once the confirmed value arrives.
#[derive(Clone, Debug, Default)]
pub struct InputHistory {
    frames: BTreeMap<u32, FrameInputs>,
}

impl InputHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the inputs used to advance from `frame`.
    pub fn record(&mut self, frame: u32, inputs: FrameInputs) {
        self.frames.insert(frame, inputs);
    }

    /// Inputs recorded for `frame`.
    pub fn get(&self, frame: u32) -> Option<&FrameInputs> {
        self.frames.get(&frame)
    }

    /// Replace one player's input on `frame`.
    ///
    /// Returns `true` when the stored value changed. A player with no entry
    /// was predicted idle, so an idle correction changes nothing.
    pub fn correct(&mut self, frame: u32, player: PlayerId, input: PlayerInput) -> bool {
        let inputs = self.frames.entry(frame).or_default();
        let previous = inputs.get(&player).copied().unwrap_or_else(PlayerInput::idle);
        if previous == input {
            return false;
        }
        inputs.insert(player, input);
        true
    }

    /// Forget every frame before `frame`.
    pub fn discard_before(&mut self, frame: u32) {
        self.frames = self.frames.split_off(&frame);
    }

    /// Forget every frame from `frame` on.
    pub fn discard_from(&mut self, frame: u32) {
        self.frames.retain(|&f, _| f < frame);
    }

    /// Number of frames recorded.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

// =============================================================================
// ROLLBACK SESSION
// =============================================================================

/// Drives a game with automatic snapshotting and input correction.
#[derive(Clone, Debug)]
pub struct RollbackSession {
    game: DeterministicGame,
    snapshots: SnapshotRing,
    inputs: InputHistory,
}

impl RollbackSession {
    /// Wrap an initialized game, keeping `window` frames of history.
    pub fn new(game: DeterministicGame, window: usize) -> Self {
        Self {
            game,
            snapshots: SnapshotRing::new(window),
            inputs: InputHistory::new(),
        }
    }

    /// The game being driven.
    pub fn game(&self) -> &DeterministicGame {
        &self.game
    }

    /// Snapshot history.
    pub fn snapshots(&self) -> &SnapshotRing {
        &self.snapshots
    }

    /// Input history.
    pub fn inputs(&self) -> &InputHistory {
        &self.inputs
    }

    /// Snapshot the current frame, then advance it with `inputs`
    /// (confirmed or predicted).
    pub fn advance(&mut self, inputs: FrameInputs) -> SimResult<Checksum> {
        let frame = self.game.frame();
        self.snapshots.push(self.game.save_state());

        let checksum = self.game.update(&inputs)?;
        self.inputs.record(frame, inputs);

        if let Some(oldest) = self.snapshots.oldest_frame() {
            self.inputs.discard_before(oldest);
        }
        Ok(checksum)
    }

    /// Apply a confirmed input for a past frame.
    ///
    /// When it differs from what was simulated, rewinds to `frame` and
    /// resimulates back up to the current frame. Returns the number of
    /// frames resimulated (0 when the prediction was right).
    ///
    /// # Errors
    ///
    /// [`SimError::RollbackUnavailable`] when `frame` is not a simulated
    /// frame still held in the history. Errors from resimulation are
    /// returned unchanged. On any error the session is left as it was.
    pub fn correct_input(
        &mut self,
        frame: u32,
        player: PlayerId,
        input: PlayerInput,
    ) -> SimResult<u32> {
        let target = self.game.frame();
        if frame >= target {
            return Err(SimError::RollbackUnavailable(frame));
        }
        let snapshot = self
            .snapshots
            .get(frame)
            .ok_or(SimError::RollbackUnavailable(frame))?;

        let mut inputs = self.inputs.clone();
        if !inputs.correct(frame, player, input) {
            return Ok(0);
        }

        // Resimulate on scratch copies; commit only when every frame succeeds.
        let mut game = self.game.clone();
        game.load_state(snapshot)?;
        let mut snapshots = self.snapshots.clone();
        snapshots.discard_after(frame);
        debug!(from = target, to = frame, player = ?player, "rolling back");

        while game.frame() < target {
            let current = game.frame();
            if current != frame {
                snapshots.push(game.save_state());
            }
            let frame_inputs = inputs.get(current).cloned().unwrap_or_default();
            game.update(&frame_inputs)?;
        }

        self.game = game;
        self.snapshots = snapshots;
        self.inputs = inputs;
        Ok(target - frame)
    }

    /// Unwrap the driven game.
    pub fn into_game(self) -> DeterministicGame {
        self.game
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// Replay a recorded match from scratch.
///
/// Returns the checksum after each frame, for comparison against a peer's
/// log to find the first diverging frame.
pub fn replay(
    seed: u64,
    config: GameConfig,
    players: &[PlayerId],
    frames: &[FrameInputs],
) -> SimResult<Vec<Checksum>> {
    let mut game = DeterministicGame::with_config(seed, config)?;
    game.initialize(players);

    frames.iter().map(|inputs| game.update(inputs)).collect()
}

/// First index where two checksum logs differ.
pub fn first_divergence(ours: &[Checksum], theirs: &[Checksum]) -> Option<usize> {
    ours.iter()
        .zip(theirs)
        .position(|(a, b)| a != b)
        .or_else(|| (ours.len() != theirs.len()).then_some(ours.len().min(theirs.len())))
}

// =============================================================================
// TESTS
// =============================================================================

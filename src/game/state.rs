//! Entity State Definitions
//!
//! Per-player records and the read-only view handed to renderers.
//! Rosters are kept as sorted `Vec`s; nothing here iterates a hash map.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;
use crate::core::hash::{Checksum, StateHasher};
use crate::core::vec2::FixedVec2;
use crate::game::input::PlayerInput;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord; entity iteration follows ascending PlayerId.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Short hex tag for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.short())
    }
}

// =============================================================================
// ENTITY RECORD
// =============================================================================

/// Simulation state of one player.
///
/// Created by `DeterministicGame::initialize`, mutated only inside
/// `DeterministicGame::update`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Owning player
    pub player_id: PlayerId,

    /// Position in the arena
    pub position: FixedVec2,

    /// Velocity in units per second
    pub velocity: FixedVec2,

    /// Facing angle in radians, kept in [0, 2π)
    pub heading: Fixed,

    /// Frames until dash is available again (0 = ready)
    pub dash_cooldown: u32,

    /// Input applied on the most recent frame
    pub last_input: PlayerInput,
}

impl EntityRecord {
    /// Create a record at rest.
    pub fn new(player_id: PlayerId, position: FixedVec2, heading: Fixed) -> Self {
        Self {
            player_id,
            position,
            velocity: FixedVec2::ZERO,
            heading,
            dash_cooldown: 0,
            last_input: PlayerInput::idle(),
        }
    }

    /// Check if dash is ready.
    #[inline]
    pub fn dash_ready(&self) -> bool {
        self.dash_cooldown == 0
    }

    /// Hash this entity for the frame checksum.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_bytes(&self.player_id.0);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_fixed(self.heading);
        hasher.update_u32(self.dash_cooldown);
        hasher.update_bytes(&self.last_input.to_bytes());
    }
}

// =============================================================================
// READ VIEW
// =============================================================================

/// Owned, read-only view of the simulation at one frame.
///
/// Consumers (rendering, audio, UI) get copies; mutating a view never
/// reaches the live game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Frame the view was taken at
    pub frame: u32,
    /// Entities in ascending PlayerId order
    pub players: Vec<EntityRecord>,
    /// Checksum of the frame
    pub checksum: Checksum,
}

impl GameView {
    /// Look up a player's entity.
    pub fn player(&self, id: &PlayerId) -> Option<&EntityRecord> {
        self.players
            .binary_search_by(|e| e.player_id.cmp(id))
            .ok()
            .map(|idx| &self.players[idx])
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    #[test]
    fn test_player_id_ordering() {
        let id1 = PlayerId::new([0; 16]);
        let id2 = PlayerId::new([1; 16]);
        let id3 = PlayerId::new([0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        assert!(id1 < id2);
        assert!(id1 < id3);
        assert!(id3 < id2);
    }

    #[test]
    fn test_player_id_uuid_roundtrip() {
        let text = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let id = PlayerId::from_uuid_str(text).unwrap();
        assert_eq!(id.to_uuid_string(), text);
        assert_eq!(id.short(), "67e55044");
        assert!(PlayerId::from_uuid_str("not-a-uuid").is_none());
    }

    #[test]
    fn test_entity_hash_covers_fields() {
        let id = PlayerId::new([3; 16]);
        let base = EntityRecord::new(id, FixedVec2::ZERO, 0);

        let digest = |e: &EntityRecord| {
            let mut h = StateHasher::new(b"entity");
            e.hash_into(&mut h);
            h.finalize()
        };

        let mut moved = base.clone();
        moved.position.x = to_fixed(1.0);
        assert_ne!(digest(&base), digest(&moved));

        let mut cooled = base.clone();
        cooled.dash_cooldown = 3;
        assert_ne!(digest(&base), digest(&cooled));

        let mut steered = base.clone();
        steered.last_input = PlayerInput::with_axes(1, 0);
        assert_ne!(digest(&base), digest(&steered));
    }

    #[test]
    fn test_view_lookup() {
        let a = PlayerId::new([1; 16]);
        let b = PlayerId::new([2; 16]);
        let view = GameView {
            frame: 4,
            players: vec![
                EntityRecord::new(a, FixedVec2::ZERO, 0),
                EntityRecord::new(b, FixedVec2::from_ints(1, 1), 0),
            ],
            checksum: 0,
        };

        assert_eq!(view.player(&b).map(|e| e.position), Some(FixedVec2::from_ints(1, 1)));
        assert!(view.player(&PlayerId::new([9; 16])).is_none());
    }
}

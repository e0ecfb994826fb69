//! State Snapshots
//!
//! A [`StateSnapshot`] is the unit of rollback and resync: everything needed
//! to resume simulation at a frame. Snapshots own their data. Producing one
//! copies out of the live game, and loading one copies back in.

use serde::{Deserialize, Serialize};

use crate::core::error::{SimError, SimResult};
use crate::core::fixed::FIXED_TWO_PI;
use crate::core::hash::{compute_checksum, Checksum};
use crate::core::rng::RandomState;
use crate::game::state::EntityRecord;

/// Checksum over `{frame, entities, rng state}`.
///
/// `entities` must already be in ascending PlayerId order.
pub fn frame_checksum(frame: u32, entities: &[EntityRecord], random_state: &RandomState) -> Checksum {
    compute_checksum(frame, random_state, |hasher| {
        hasher.update_u32(entities.len() as u32);
        for entity in entities {
            entity.hash_into(hasher);
        }
    })
}

/// Immutable record of simulation state at a frame.
///
/// Fields are private: a snapshot is either produced by
/// `DeterministicGame::save_state` or decoded from bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    frame: u32,
    entities: Vec<EntityRecord>,
    random_state: RandomState,
    checksum: Checksum,
}

impl StateSnapshot {
    /// Capture a snapshot, computing its checksum.
    pub(crate) fn capture(frame: u32, entities: Vec<EntityRecord>, random_state: RandomState) -> Self {
        let checksum = frame_checksum(frame, &entities, &random_state);
        Self {
            frame,
            entities,
            random_state,
            checksum,
        }
    }

    /// Frame this snapshot was taken at.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Entities in ascending PlayerId order.
    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    /// RNG state at this frame.
    pub fn random_state(&self) -> RandomState {
        self.random_state
    }

    /// Checksum of this frame.
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// Check internal consistency.
    ///
    /// # Errors
    /// [`SimError::InvalidSnapshot`] when entities are unsorted or
    /// duplicated, a heading is out of range, or the stored checksum does
    /// not match the contents.
    pub fn validate(&self) -> SimResult<()> {
        for pair in self.entities.windows(2) {
            if pair[0].player_id >= pair[1].player_id {
                return Err(SimError::InvalidSnapshot(format!(
                    "entities not in strictly ascending order at {:?}",
                    pair[1].player_id
                )));
            }
        }

        if let Some(entity) = self
            .entities
            .iter()
            .find(|e| e.heading < 0 || e.heading >= FIXED_TWO_PI)
        {
            return Err(SimError::InvalidSnapshot(format!(
                "heading {} out of range for {:?}",
                entity.heading, entity.player_id
            )));
        }

        let expected = frame_checksum(self.frame, &self.entities, &self.random_state);
        if expected != self.checksum {
            return Err(SimError::InvalidSnapshot(format!(
                "checksum mismatch: stored {:016x}, computed {:016x}",
                self.checksum, expected
            )));
        }

        Ok(())
    }

    /// Encode to bincode bytes for transport.
    pub fn to_bytes(&self) -> SimResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| SimError::InvalidSnapshot(e.to_string()))
    }

    /// Decode from bincode bytes and validate.
    pub fn from_bytes(bytes: &[u8]) -> SimResult<Self> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| SimError::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Encode to JSON (debugging, resync logs).
    pub fn to_json(&self) -> SimResult<String> {
        serde_json::to_string(self).map_err(|e| SimError::InvalidSnapshot(e.to_string()))
    }

    /// Decode from JSON and validate.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| SimError::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Copy with a mutated entity list, checksum left stale.
    #[cfg(test)]
    pub(crate) fn with_entities_unchecked(&self, entities: Vec<EntityRecord>) -> Self {
        Self {
            entities,
            ..self.clone()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::FixedVec2;
    use crate::game::state::PlayerId;

    fn sample() -> StateSnapshot {
        let entities = vec![
            EntityRecord::new(PlayerId::new([1; 16]), FixedVec2::from_ints(1, 2), 0),
            EntityRecord::new(PlayerId::new([2; 16]), FixedVec2::from_ints(-3, 4), 1000),
        ];
        StateSnapshot::capture(12, entities, RandomState { seed: 42, cursor: 30 })
    }

    #[test]
    fn test_capture_is_valid() {
        let snapshot = sample();
        assert_eq!(snapshot.frame(), 12);
        assert_eq!(snapshot.entities().len(), 2);
        assert_eq!(snapshot.random_state().cursor, 30);
        assert_eq!(snapshot.validate(), Ok(()));
    }

    #[test]
    fn test_bincode_roundtrip() {
        let snapshot = sample();
        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(StateSnapshot::from_bytes(&bytes), Ok(snapshot));
    }

    #[test]
    fn test_json_roundtrip() {
        let snapshot = sample();
        let json = snapshot.to_json().unwrap();
        assert_eq!(StateSnapshot::from_json(&json), Ok(snapshot));
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let bytes = sample().to_bytes().unwrap();
        let err = StateSnapshot::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, SimError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_tampered_checksum_rejected() {
        let snapshot = sample();
        let mut entities = snapshot.entities().to_vec();
        entities[0].position.x += 1;
        let tampered = snapshot.with_entities_unchecked(entities);

        let err = tampered.validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidSnapshot(msg) if msg.contains("checksum")));
    }

    #[test]
    fn test_unsorted_entities_rejected() {
        let snapshot = sample();
        let mut entities = snapshot.entities().to_vec();
        entities.reverse();
        let reordered = snapshot.with_entities_unchecked(entities);

        let err = reordered.validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidSnapshot(msg) if msg.contains("ascending")));
    }

    #[test]
    fn test_duplicate_entities_rejected() {
        let snapshot = sample();
        let mut entities = snapshot.entities().to_vec();
        entities[1].player_id = entities[0].player_id;
        let duplicated = snapshot.with_entities_unchecked(entities);

        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn test_checksum_depends_on_rng_cursor() {
        let a = sample();
        let b = StateSnapshot::capture(
            a.frame(),
            a.entities().to_vec(),
            RandomState { seed: 42, cursor: 31 },
        );
        assert_ne!(a.checksum(), b.checksum());
    }
}

//! Deterministic Game Orchestrator
//!
//! Owns the entity table, the RNG and the frame counter, and advances them
//! one frame per [`DeterministicGame::update`] call.
//!
//! Forward play and rollback resimulation run the exact same update path.
//! The only difference is whether [`DeterministicGame::load_state`] was
//! called in between.
//!
//! # Determinism
//!
//! - Entities are stepped in ascending PlayerId order
//! - Fixed-point math only
//! - All randomness from the game's own [`DeterministicRandom`]
//! - No wall clock, no I/O, no floats in the step

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::core::error::{SimError, SimResult};
use crate::core::fixed::{
    fixed_add, fixed_clamp, fixed_mul, fixed_sub, fixed_wrap_angle, Fixed, FIXED_ONE, FIXED_PI,
    FIXED_TWO_PI,
};
use crate::core::hash::Checksum;
use crate::core::rng::{DeterministicRandom, RandomState};
use crate::core::vec2::FixedVec2;
use crate::game::config::{GameConfig, TICK_DT};
use crate::game::input::PlayerInput;
use crate::game::snapshot::{frame_checksum, StateSnapshot};
use crate::game::state::{EntityRecord, GameView, PlayerId};

/// Dash strength is scaled by a random factor in [0.75, 1.25).
const DASH_SPREAD_MIN: Fixed = FIXED_ONE - FIXED_ONE / 4;
const DASH_SPREAD_MAX: Fixed = FIXED_ONE + FIXED_ONE / 4;

/// Frame-stepped simulation with save/load for rollback.
///
/// One instance per match. Pass it explicitly to whatever drives it; there
/// is no global game state.
#[derive(Clone, Debug)]
pub struct DeterministicGame {
    seed: u64,
    config: GameConfig,
    frame: u32,
    entities: Vec<EntityRecord>,
    rng: DeterministicRandom,
    checksum: Checksum,
    initialized: bool,
}

impl DeterministicGame {
    /// Create a game with the default tuning.
    pub fn new(seed: u64) -> Self {
        let rng = DeterministicRandom::new(seed);
        let checksum = frame_checksum(0, &[], &rng.save());
        Self {
            seed,
            config: GameConfig::default(),
            frame: 0,
            entities: Vec::new(),
            rng,
            checksum,
            initialized: false,
        }
    }

    /// Create a game with custom tuning.
    pub fn with_config(seed: u64, config: GameConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(seed)
        })
    }

    /// Create one entity per player and start at frame 0.
    ///
    /// Ids are sorted and de-duplicated; ascending PlayerId is the
    /// iteration order for every later frame. Players spawn evenly spaced
    /// on the spawn circle, facing its centre. Calling this again restarts
    /// the match.
    pub fn initialize(&mut self, player_ids: &[PlayerId]) {
        let mut ids = player_ids.to_vec();
        ids.sort();
        ids.dedup();

        let count = ids.len() as i64;
        self.entities = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let angle = (FIXED_TWO_PI as i64 * i as i64 / count) as Fixed;
                let position = FixedVec2::from_angle(angle).scale(self.config.spawn_radius);
                let heading = fixed_wrap_angle(fixed_add(angle, FIXED_PI));
                EntityRecord::new(*id, position, heading)
            })
            .collect();

        self.rng.reset();
        self.frame = 0;
        self.initialized = true;
        self.refresh_checksum();

        debug!(
            players = self.entities.len(),
            seed = self.seed,
            checksum = %format!("{:016x}", self.checksum),
            "match initialized"
        );
    }

    /// Advance one frame.
    ///
    /// Players missing from `inputs` get [`PlayerInput::idle`]. Inputs for
    /// unknown players are ignored.
    ///
    /// # Errors
    ///
    /// Any fixed-point or RNG fault is returned unchanged. A failed update
    /// leaves the game exactly as it was before the call.
    pub fn update(&mut self, inputs: &BTreeMap<PlayerId, PlayerInput>) -> SimResult<Checksum> {
        for id in inputs.keys() {
            if self.entity_index(id).is_none() {
                warn!(player = ?id, frame = self.frame, "input for unknown player ignored");
            }
        }

        // Step a scratch copy so an error cannot leave a half-applied frame.
        let mut entities = self.entities.clone();
        let mut rng = self.rng.clone();

        for entity in entities.iter_mut() {
            let input = inputs
                .get(&entity.player_id)
                .copied()
                .unwrap_or_else(PlayerInput::idle);
            step_entity(entity, input, &mut rng, &self.config)?;
        }

        self.entities = entities;
        self.rng = rng;
        self.frame = self.frame.wrapping_add(1);
        self.refresh_checksum();

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(
            frame = self.frame,
            checksum = %format!("{:016x}", self.checksum),
            "frame advanced"
        );

        Ok(self.checksum)
    }

    /// Read-only view of the current frame.
    pub fn get_state(&self) -> GameView {
        GameView {
            frame: self.frame,
            players: self.entities.clone(),
            checksum: self.checksum,
        }
    }

    /// Copy the full simulation state into a new snapshot.
    pub fn save_state(&self) -> StateSnapshot {
        let snapshot = StateSnapshot::capture(self.frame, self.entities.clone(), self.rng.save());
        debug!(frame = self.frame, "state saved");
        snapshot
    }

    /// Restore the simulation to a snapshot.
    ///
    /// The next [`Self::update`] behaves exactly as if the game had been
    /// running continuously from the snapshot's frame.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidSnapshot`] when the snapshot fails validation,
    /// was produced under a different seed, or (once initialized) holds a
    /// different roster. Nothing is applied on error.
    pub fn load_state(&mut self, snapshot: &StateSnapshot) -> SimResult<()> {
        snapshot.validate()?;

        let random_state = snapshot.random_state();
        if random_state.seed != self.seed {
            return Err(SimError::InvalidSnapshot(format!(
                "seed mismatch: game {}, snapshot {}",
                self.seed, random_state.seed
            )));
        }

        if self.initialized {
            let same_roster = self.entities.len() == snapshot.entities().len()
                && self
                    .entities
                    .iter()
                    .zip(snapshot.entities())
                    .all(|(live, saved)| live.player_id == saved.player_id);
            if !same_roster {
                return Err(SimError::InvalidSnapshot("roster mismatch".into()));
            }
        }

        let previous = self.frame;
        self.frame = snapshot.frame();
        self.entities = snapshot.entities().to_vec();
        self.rng.load(random_state);
        self.checksum = snapshot.checksum();
        self.initialized = true;

        debug!(from = previous, to = self.frame, "state loaded");
        Ok(())
    }

    /// Current frame number.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Checksum of the current frame.
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// Root seed of this match.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Tuning in use.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Copy of the RNG state.
    pub fn random_state(&self) -> RandomState {
        self.rng.save()
    }

    /// Roster in iteration order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.entities.iter().map(|e| e.player_id).collect()
    }

    /// Whether `initialize` or `load_state` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn entity_index(&self, id: &PlayerId) -> Option<usize> {
        self.entities.binary_search_by(|e| e.player_id.cmp(id)).ok()
    }

    fn refresh_checksum(&mut self) {
        self.checksum = frame_checksum(self.frame, &self.entities, &self.rng.save());
    }
}

/// Advance one entity by one frame.
///
/// Order: steer, thrust, dash, friction, turbulence, speed cap,
/// integrate, wall bounce. Draws exactly two RNG values, plus one more
/// when a dash fires.
fn step_entity(
    entity: &mut EntityRecord,
    input: PlayerInput,
    rng: &mut DeterministicRandom,
    config: &GameConfig,
) -> SimResult<()> {
    // 1. Steer
    let turn = fixed_mul(input.turn_fixed(), config.turn_rate);
    entity.heading = fixed_wrap_angle(fixed_add(entity.heading, turn));
    let facing = FixedVec2::from_angle(entity.heading);

    // 2. Thrust: v += facing * thrust * accel * dt
    let accel = fixed_mul(input.thrust_fixed(), config.thrust_accel);
    let mut velocity = entity.velocity.add(facing.scale(fixed_mul(accel, TICK_DT)));

    // 3. Dash
    if entity.dash_cooldown > 0 {
        entity.dash_cooldown -= 1;
    }
    if input.dash_pressed() && entity.dash_ready() {
        let spread = rng.next_fixed_range(DASH_SPREAD_MIN, DASH_SPREAD_MAX)?;
        let impulse = fixed_mul(config.dash_impulse, spread);
        velocity = velocity.add(facing.scale(impulse));
        entity.dash_cooldown = config.dash_cooldown_frames;
    }

    // 4. Friction
    let friction = if input.brake_held() {
        config.brake_friction
    } else {
        config.friction
    };
    velocity = velocity.scale(friction);

    // 5. Turbulence (raw units, both axes)
    let t = config.turbulence;
    velocity.x = fixed_add(velocity.x, rng.next_int(-t, t + 1)?);
    velocity.y = fixed_add(velocity.y, rng.next_int(-t, t + 1)?);

    // 6. Speed cap
    let max_sq = fixed_mul(config.max_speed, config.max_speed);
    if velocity.length_squared() > max_sq {
        velocity = velocity.normalize()?.scale(config.max_speed);
    }

    // 7. Integrate
    let mut position = entity.position.add(velocity.scale(TICK_DT));

    // 8. Reflect off the arena walls
    let ext = config.arena_half_extent;
    (position.x, velocity.x) = reflect(position.x, velocity.x, ext);
    (position.y, velocity.y) = reflect(position.y, velocity.y, ext);

    entity.position = position;
    entity.velocity = velocity;
    entity.last_input = input;
    Ok(())
}

/// Mirror a coordinate that crossed `±extent` back inside and flip its
/// velocity component.
fn reflect(pos: Fixed, vel: Fixed, extent: Fixed) -> (Fixed, Fixed) {
    if pos > extent {
        let bounced = fixed_sub(extent, fixed_sub(pos, extent));
        (fixed_clamp(bounced, -extent, extent), vel.wrapping_neg())
    } else if pos < -extent {
        let bounced = fixed_sub(-extent, fixed_sub(pos, -extent));
        (fixed_clamp(bounced, -extent, extent), vel.wrapping_neg())
    } else {
        (pos, vel)
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Simulation Tuning
//!
//! All values are raw Q16.16 integers so a config file round-trips exactly.
//! Every peer in a match must run with the same config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{SimError, SimResult};
use crate::core::fixed::{Fixed, FIXED_ONE};

/// Frame duration: 1/60 second = round(65536/60) = 1092
pub const TICK_DT: Fixed = 1092;

/// Simulation frame rate (Hz)
pub const FRAME_RATE: u32 = 60;

/// Upper bound for max_speed and dash_impulse: 64.0
const MAX_SPEED_LIMIT: Fixed = 64 * FIXED_ONE;

/// Upper bound for thrust_accel: 1000.0
const MAX_THRUST_LIMIT: Fixed = 1000 * FIXED_ONE;

/// Upper bound for arena_half_extent: 16384.0
///
/// A capped velocity moves at most ~1.07 units per frame, so a position
/// at the wall plus one frame of travel stays far below `FIXED_MAX`.
pub const MAX_ARENA_EXTENT: Fixed = 16384 * FIXED_ONE;

/// Tuning parameters for the frame step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Arena half-extent: 50.0 = 3276800
    pub arena_half_extent: Fixed,
    /// Speed cap in units/sec: 12.0 = 786432
    pub max_speed: Fixed,
    /// Acceleration at full thrust in units/sec²: 20.0 = 1310720
    pub thrust_accel: Fixed,
    /// Turn rate at full steering in radians/frame: 0.08 = 5242
    pub turn_rate: Fixed,
    /// Velocity kept per frame without brake: ~0.95 = 62259
    pub friction: Fixed,
    /// Velocity kept per frame with brake: ~0.80 = 52428
    pub brake_friction: Fixed,
    /// Dash impulse in units/sec: 8.0 = 524288
    pub dash_impulse: Fixed,
    /// Frames between dashes (0.75 s)
    pub dash_cooldown_frames: u32,
    /// Max random velocity nudge per axis per frame, raw units: ~0.02 = 1310
    pub turbulence: Fixed,
    /// Radius of the spawn circle: 20.0 = 1310720
    pub spawn_radius: Fixed,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_half_extent: 3276800,
            max_speed: 786432,
            thrust_accel: 1310720,
            turn_rate: 5242,
            friction: 62259,
            brake_friction: 52428,
            dash_impulse: 524288,
            dash_cooldown_frames: 45,
            turbulence: 1310,
            spawn_radius: 1310720,
        }
    }
}

impl GameConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> SimResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SimError::InvalidConfig(e.to_string()))
    }

    /// Reject tuning the frame step cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        // Bounds keep positions and squared speeds inside the Q16.16 range.
        if self.arena_half_extent <= 0 || self.arena_half_extent > MAX_ARENA_EXTENT {
            return Err(SimError::InvalidConfig(
                "arena_half_extent must be in (0, 16384]".into(),
            ));
        }
        if self.max_speed <= 0 || self.max_speed > MAX_SPEED_LIMIT {
            return Err(SimError::InvalidConfig("max_speed must be in (0, 64]".into()));
        }
        if self.dash_impulse < 0 || self.dash_impulse > MAX_SPEED_LIMIT {
            return Err(SimError::InvalidConfig("dash_impulse must be in [0, 64]".into()));
        }
        if self.thrust_accel < 0 || self.thrust_accel > MAX_THRUST_LIMIT {
            return Err(SimError::InvalidConfig("thrust_accel must be in [0, 1000]".into()));
        }
        for (name, value) in [("friction", self.friction), ("brake_friction", self.brake_friction)] {
            if value <= 0 || value > FIXED_ONE {
                return Err(SimError::InvalidConfig(format!("{} must be in (0, 1]", name)));
            }
        }
        if self.turbulence < 0 || self.turbulence > FIXED_ONE {
            return Err(SimError::InvalidConfig("turbulence must be in [0, 1]".into()));
        }
        if self.spawn_radius < 0 || self.spawn_radius > self.arena_half_extent {
            return Err(SimError::InvalidConfig(
                "spawn_radius must lie within the arena".into(),
            ));
        }
        Ok(())
    }
}

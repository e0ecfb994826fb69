//! Player Input Records
//!
//! The abstract per-player input the frame step consumes. Device mapping
//! happens outside this crate; by the time a record gets here it is three
//! primitive bytes.
//! Axis bytes convert to Fixed through a lookup table (AXIS_LUT).

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;

// =============================================================================
// AXIS LOOKUP TABLE
// =============================================================================

/// Lookup table for converting an i8 axis to Fixed.
///
/// Converting i8 [-127..+127] to Fixed [-1.0..+1.0] is
/// `value * 65536 / 127`, which is not an integer multiple, so every
/// value is precomputed with truncating integer division.
///
/// # Special Values
///
/// - Index 128 (-128 as i8) = 0 (axis released / no input)
pub static AXIS_LUT: [Fixed; 256] = {
    let mut lut = [0i32; 256];
    let mut i = 0i32;
    while i < 256 {
        // Treat as signed: 0..127 = positive, 128..255 = negative (-128..-1)
        let signed = if i < 128 { i } else { i - 256 };

        if signed == -128 {
            lut[i as usize] = 0;
        } else {
            lut[i as usize] = (signed * 65536) / 127;
        }
        i += 1;
    }
    lut
};

/// Convert an i8 axis value to Fixed using the lookup table.
#[inline]
pub fn axis_to_fixed(input: i8) -> Fixed {
    AXIS_LUT[(input as u8) as usize]
}

// =============================================================================
// INPUT RECORD
// =============================================================================

/// Input for one player for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Steering: -127 (clockwise) to +127 (counter-clockwise)
    /// -128 = released
    pub turn: i8,

    /// Forward thrust: -127 (reverse) to +127 (full ahead)
    /// -128 = released
    pub thrust: i8,

    /// Action flags (packed bits):
    /// - Bit 0: Dash
    /// - Bit 1: Brake
    /// - Bit 2-7: Reserved
    pub flags: u8,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self::idle()
    }
}

impl PlayerInput {
    /// Size in bytes
    pub const SIZE: usize = 3;

    /// Axis value meaning "released"
    pub const NO_INPUT: i8 = -128;

    /// Dash flag bit
    pub const FLAG_DASH: u8 = 0x01;

    /// Brake flag bit
    pub const FLAG_BRAKE: u8 = 0x02;

    /// Input used for a player with no record this frame.
    pub const fn idle() -> Self {
        Self {
            turn: Self::NO_INPUT,
            thrust: Self::NO_INPUT,
            flags: 0,
        }
    }

    /// Create input with steering and thrust.
    pub const fn with_axes(turn: i8, thrust: i8) -> Self {
        Self { turn, thrust, flags: 0 }
    }

    /// Builder: set the dash flag.
    pub const fn dashing(mut self) -> Self {
        self.flags |= Self::FLAG_DASH;
        self
    }

    /// Builder: set the brake flag.
    pub const fn braking(mut self) -> Self {
        self.flags |= Self::FLAG_BRAKE;
        self
    }

    /// Steering as Fixed in [-1.0, 1.0].
    #[inline]
    pub fn turn_fixed(&self) -> Fixed {
        axis_to_fixed(self.turn)
    }

    /// Thrust as Fixed in [-1.0, 1.0].
    #[inline]
    pub fn thrust_fixed(&self) -> Fixed {
        axis_to_fixed(self.thrust)
    }

    /// Check if dash was pressed this frame.
    #[inline]
    pub fn dash_pressed(&self) -> bool {
        self.flags & Self::FLAG_DASH != 0
    }

    /// Check if brake is held this frame.
    #[inline]
    pub fn brake_held(&self) -> bool {
        self.flags & Self::FLAG_BRAKE != 0
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.turn == Self::NO_INPUT && self.thrust == Self::NO_INPUT && self.flags == 0
    }

    /// Pack into wire bytes.
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        [self.turn as u8, self.thrust as u8, self.flags]
    }

    /// Unpack from wire bytes.
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            turn: bytes[0] as i8,
            thrust: bytes[1] as i8,
            flags: bytes[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::FIXED_ONE;

    #[test]
    fn test_axis_lut_endpoints() {
        assert_eq!(axis_to_fixed(0), 0);
        assert_eq!(axis_to_fixed(127), FIXED_ONE);
        assert_eq!(axis_to_fixed(-127), -FIXED_ONE);
        assert_eq!(axis_to_fixed(PlayerInput::NO_INPUT), 0);
    }

    #[test]
    fn test_axis_lut_symmetric() {
        for v in 1..=127i8 {
            assert_eq!(axis_to_fixed(v), -axis_to_fixed(-v));
        }
    }

    #[test]
    fn test_flags() {
        let input = PlayerInput::with_axes(10, 20).dashing();
        assert!(input.dash_pressed());
        assert!(!input.brake_held());

        let input = PlayerInput::idle().braking();
        assert!(input.brake_held());
        assert!(!input.is_idle());

        assert!(PlayerInput::default().is_idle());
    }

    #[test]
    fn test_wire_bytes() {
        let input = PlayerInput::with_axes(-5, 127).dashing().braking();
        let bytes = input.to_bytes();
        assert_eq!(bytes, [0xFB, 0x7F, 0x03]);
        assert_eq!(PlayerInput::from_bytes(bytes), input);
    }
}

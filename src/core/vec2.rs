//! Fixed-Point 2D Vector
//!
//! Positions, velocities and headings for the frame step. Component math
//! goes through the `fixed` helpers so overflow and rounding match on
//! every peer.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::error::SimResult;
use super::fixed::{
    fixed_add, fixed_clamp, fixed_cos, fixed_div, fixed_mul, fixed_sin, fixed_sqrt, fixed_sub,
    from_fixed, Fixed, FIXED_ONE, FIXED_SCALE,
};

/// Q16.16 2D vector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16)
    pub x: Fixed,
    /// Y component (Q16.16)
    pub y: Fixed,
}

impl FixedVec2 {
    /// (0, 0)
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// +X
    pub const RIGHT: Self = Self { x: FIXED_ONE, y: 0 };

    /// +Y
    pub const UP: Self = Self { x: 0, y: FIXED_ONE };

    /// From raw Q16.16 components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// From whole-unit components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
        }
    }

    /// Unit vector pointing along `angle` (Q16.16 radians).
    #[inline]
    pub fn from_angle(angle: Fixed) -> Self {
        Self {
            x: fixed_cos(angle),
            y: fixed_sin(angle),
        }
    }

    /// Component-wise wrapping add.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: fixed_add(self.x, other.x),
            y: fixed_add(self.y, other.y),
        }
    }

    /// Component-wise wrapping subtract.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: fixed_sub(self.x, other.x),
            y: fixed_sub(self.y, other.y),
        }
    }

    /// Multiply both components by `scalar`.
    #[inline]
    pub fn scale(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_mul(self.x, scalar),
            y: fixed_mul(self.y, scalar),
        }
    }

    /// Divide both components by `scalar`.
    ///
    /// # Errors
    /// [`SimError::DivisionByZero`](super::error::SimError::DivisionByZero) when `scalar` is 0.
    #[inline]
    pub fn div_scalar(self, scalar: Fixed) -> SimResult<Self> {
        Ok(Self {
            x: fixed_div(self.x, scalar)?,
            y: fixed_div(self.y, scalar)?,
        })
    }

    /// `x² + y²`, no square root.
    #[inline]
    pub fn length_squared(self) -> Fixed {
        fixed_add(fixed_mul(self.x, self.x), fixed_mul(self.y, self.y))
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.length_squared())
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    #[inline]
    pub fn normalize(self) -> SimResult<Self> {
        let len = self.length();
        if len == 0 {
            return Ok(Self::ZERO);
        }
        self.div_scalar(len)
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> Fixed {
        fixed_add(fixed_mul(self.x, other.x), fixed_mul(self.y, other.y))
    }

    /// Clamp each component into `[min, max]`.
    #[inline]
    pub fn clamp(self, min: Fixed, max: Fixed) -> Self {
        Self {
            x: fixed_clamp(self.x, min, max),
            y: fixed_clamp(self.y, min, max),
        }
    }

    /// Flip both components (wrapping).
    #[inline]
    pub fn negate(self) -> Self {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
        }
    }

    /// Lossy float pair for logs and tests.
    #[inline]
    pub fn to_floats(self) -> (f64, f64) {
        (from_fixed(self.x), from_fixed(self.y))
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        FixedVec2::add(self, rhs)
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        FixedVec2::sub(self, rhs)
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.negate()
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "FixedVec2({:.3}, {:.3})", fx, fy)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "({:.3}, {:.3})", fx, fy)
    }
}

// =============================================================================
// TESTS
// =============================================================================

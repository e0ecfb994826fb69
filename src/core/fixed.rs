//! Q16.16 Fixed-Point Arithmetic
//!
//! Integer-only math for the frame step. Floats appear only in the
//! boundary conversions below.
//!
//! ## Format
//!
//! `Fixed` is an `i32` holding `value * 65536`: 16 integer bits (with sign)
//! and 16 fractional bits. Range is about ±32768 with a resolution of
//! 1/65536.
//!
//! ## Edge cases
//!
//! - Add/sub/mul wrap on overflow (two's complement).
//! - [`fixed_div`] by zero is an error ([`SimError::DivisionByZero`]).
//! - [`fixed_sqrt`] of a negative value is `0`, not an error.
//! - [`fixed_sin`]/[`fixed_cos`] never touch float intrinsics.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::error::{SimError, SimResult};

/// Raw Q16.16 value.
pub type Fixed = i32;

/// Fractional bits
pub const FIXED_SCALE: i32 = 16;

/// 1.0
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// 0.5
pub const FIXED_HALF: Fixed = FIXED_ONE / 2;

/// Largest representable value (~32767.99998)
pub const FIXED_MAX: Fixed = i32::MAX;

/// Smallest representable value (-32768.0)
pub const FIXED_MIN: Fixed = i32::MIN;

/// π: round(3.14159265 * 65536) = 205887
pub const FIXED_PI: Fixed = 205887;

/// π/2: round(1.57079633 * 65536) = 102944
pub const FIXED_HALF_PI: Fixed = 102944;

/// 2π: round(6.28318531 * 65536) = 411775
pub const FIXED_TWO_PI: Fixed = 411775;

// =============================================================================
// BOUNDARY CONVERSIONS (never inside the frame step)
// =============================================================================

/// Convert a float to fixed-point, truncating toward zero.
///
/// # Warning
/// Only use at compile-time, for config authoring, or in tests.
/// NEVER inside the frame step.
///
/// ```
/// use lockstep_core::core::fixed::{to_fixed, FIXED_ONE};
/// const DASH: i32 = to_fixed(2.5);
/// assert_eq!(DASH, 5 * FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for rendering and telemetry.
///
/// # Warning
/// Only use for output. NEVER feed the result back into simulation.
#[inline]
pub fn from_fixed(f: Fixed) -> f64 {
    f as f64 / FIXED_ONE as f64
}

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Add two fixed-point numbers (wrapping).
#[inline]
pub fn fixed_add(a: Fixed, b: Fixed) -> Fixed {
    a.wrapping_add(b)
}

/// Subtract two fixed-point numbers (wrapping).
#[inline]
pub fn fixed_sub(a: Fixed, b: Fixed) -> Fixed {
    a.wrapping_sub(b)
}

/// Q16.16 product.
///
/// Widens to i64 so no precision is lost before the shift back down.
/// The arithmetic shift floors toward negative infinity; the final
/// narrowing wraps.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Q16.16 quotient.
///
/// Pre-shifts the numerator in i64 to keep the fractional bits, then
/// truncates toward zero.
///
/// # Errors
/// [`SimError::DivisionByZero`] when `b == 0`.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> SimResult<Fixed> {
    if b == 0 {
        return Err(SimError::DivisionByZero);
    }
    let wide = (a as i64) << FIXED_SCALE;
    Ok((wide / b as i64) as Fixed)
}

/// Q16.16 square root.
///
/// Returns 0 for non-positive inputs. For positive inputs the result is
/// the exact floor of the Q16.16 square root, computed as the integer
/// square root of `x << 16`.
#[inline]
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    if x <= 0 {
        return 0;
    }
    isqrt_u64((x as u64) << FIXED_SCALE) as Fixed
}

/// Integer square root, digit by digit. At most 32 iterations.
fn isqrt_u64(n: u64) -> u64 {
    let mut rem = n;
    let mut root = 0u64;
    let mut bit = 1u64 << 62;

    while bit > rem {
        bit >>= 2;
    }

    while bit != 0 {
        if rem >= root + bit {
            rem -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }

    root
}

/// Sine of an angle in Q16.16 radians.
///
/// Reduces the angle into `[-π/2, π/2]` with integer constants, then
/// evaluates the Taylor polynomial up to x^9 in Horner form on i64.
/// Output is clamped to `[-1.0, 1.0]`.
#[inline]
pub fn fixed_sin(angle: Fixed) -> Fixed {
    sin_wide(angle as i64)
}

/// Cosine of an angle in Q16.16 radians: `sin(angle + π/2)`.
#[inline]
pub fn fixed_cos(angle: Fixed) -> Fixed {
    sin_wide(angle as i64 + FIXED_HALF_PI as i64)
}

fn sin_wide(angle: i64) -> Fixed {
    let pi = FIXED_PI as i64;
    let half_pi = FIXED_HALF_PI as i64;
    let one = FIXED_ONE as i64;

    // [0, 2π) -> (-π, π] -> [-π/2, π/2]
    let mut x = angle.rem_euclid(FIXED_TWO_PI as i64);
    if x > pi {
        x -= FIXED_TWO_PI as i64;
    }
    if x > half_pi {
        x = pi - x;
    } else if x < -half_pi {
        x = -pi - x;
    }

    // sin x = x(1 - x²/6(1 - x²/20(1 - x²/42(1 - x²/72))))
    let x2 = (x * x) >> FIXED_SCALE;
    let mut t = one - x2 / 72;
    t = one - ((x2 * t) >> FIXED_SCALE) / 42;
    t = one - ((x2 * t) >> FIXED_SCALE) / 20;
    t = one - ((x2 * t) >> FIXED_SCALE) / 6;

    let result = (x * t) >> FIXED_SCALE;
    result.clamp(-one, one) as Fixed
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn fixed_wrap_angle(angle: Fixed) -> Fixed {
    (angle as i64).rem_euclid(FIXED_TWO_PI as i64) as Fixed
}

/// Absolute value. `FIXED_MIN` wraps to itself.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    x.wrapping_abs()
}

/// Smaller of `a` and `b`.
#[inline]
pub fn fixed_min(a: Fixed, b: Fixed) -> Fixed {
    a.min(b)
}

/// Larger of `a` and `b`.
#[inline]
pub fn fixed_max(a: Fixed, b: Fixed) -> Fixed {
    a.max(b)
}

/// Clamp `value` into `[min, max]`. Never panics, even when `min > max`.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    fixed_min(fixed_max(value, min), max)
}

/// `a + (b - a) * t`, with `t` in Q16.16 (`FIXED_ONE` lands on `b`).
#[inline]
pub fn fixed_lerp(a: Fixed, b: Fixed, t: Fixed) -> Fixed {
    fixed_add(a, fixed_mul(fixed_sub(b, a), t))
}

// =============================================================================
// FIXEDNUM WRAPPER
// =============================================================================

/// `Fixed` with arithmetic operators, for tuning code and tests.
///
/// There is no `Div` impl: [`FixedNum::checked_div`] returns the
/// division-by-zero error instead.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedNum(pub Fixed);

impl FixedNum {
    /// 0.0
    pub const ZERO: Self = Self(0);

    /// 1.0
    pub const ONE: Self = Self(FIXED_ONE);

    /// Wrap a raw Q16.16 value.
    #[inline]
    pub const fn from_raw(raw: Fixed) -> Self {
        Self(raw)
    }

    /// Whole number `i`.
    #[inline]
    pub const fn from_int(i: i32) -> Self {
        Self(i << FIXED_SCALE)
    }

    /// Underlying Q16.16 value.
    #[inline]
    pub const fn raw(self) -> Fixed {
        self.0
    }

    /// Lossy float, for display only.
    #[inline]
    pub fn to_float(self) -> f64 {
        from_fixed(self.0)
    }

    /// See [`fixed_div`].
    #[inline]
    pub fn checked_div(self, rhs: Self) -> SimResult<Self> {
        fixed_div(self.0, rhs.0).map(Self)
    }

    /// See [`fixed_sqrt`].
    #[inline]
    pub fn sqrt(self) -> Self {
        Self(fixed_sqrt(self.0))
    }

    /// See [`fixed_sin`].
    #[inline]
    pub fn sin(self) -> Self {
        Self(fixed_sin(self.0))
    }

    /// See [`fixed_cos`].
    #[inline]
    pub fn cos(self) -> Self {
        Self(fixed_cos(self.0))
    }
}

impl Add for FixedNum {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(fixed_add(self.0, rhs.0))
    }
}

impl Sub for FixedNum {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(fixed_sub(self.0, rhs.0))
    }
}

impl Mul for FixedNum {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(fixed_mul(self.0, rhs.0))
    }
}

impl Neg for FixedNum {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl fmt::Debug for FixedNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedNum({} = {:.4})", self.0, self.to_float())
    }
}

impl fmt::Display for FixedNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_float())
    }
}

// =============================================================================
// TESTS
// =============================================================================

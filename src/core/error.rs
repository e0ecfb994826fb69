//! Simulation Errors
//!
//! Every fault in the deterministic core is fatal to the call that hit it.
//! Errors are surfaced to the caller unchanged, never replaced by a default.

/// Errors raised by the deterministic core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// Fixed-point division with a zero divisor.
    #[error("fixed-point division by zero")]
    DivisionByZero,

    /// Random range with `min >= max`.
    #[error("invalid random range [{min}, {max})")]
    InvalidRange {
        /// Requested lower bound (inclusive)
        min: i64,
        /// Requested upper bound (exclusive)
        max: i64,
    },

    /// Snapshot is malformed or does not belong to this game.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Tuning parameters out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Requested frame is no longer held in the rollback buffer.
    #[error("no snapshot available for frame {0}")]
    RollbackUnavailable(u32),
}

/// Result alias for core operations.
pub type SimResult<T> = Result<T, SimError>;

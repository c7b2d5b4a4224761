//! Error types for the recommendation engine.

use catalog::Pool;
use thiserror::Error;

/// Errors raised by reconstruction and mixing
///
/// None of these are fatal for a session: the caller can report them and retry
/// with a smaller `k`, a different pool or a different volume.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Not enough (or unusable) taste data to fit a model
    #[error("Insufficient data: {reason}")]
    InsufficientData { reason: String },

    /// No ingredient survived the alcohol-preference filter
    #[error("No candidate ingredients in the {pool} pool")]
    EmptyCandidateSet { pool: Pool },

    /// Requested ingredient count is not positive
    #[error("Invalid ingredient count k={k}: must be at least 1")]
    InvalidK { k: usize },

    /// Target volume is zero, negative or not a number
    #[error("Invalid total volume {volume} ml: must be a positive finite number")]
    InvalidVolume { volume: f64 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;

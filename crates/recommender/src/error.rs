//! Error types for the recommendation orchestrator.

use engine::EngineError;
use thiserror::Error;

/// Errors returned by [`crate::RecommendationOrchestrator::recommend`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Reconstruction or mixing failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Split share outside the open interval (0, 1)
    #[error("Invalid alcoholic share {share}: must be strictly between 0 and 1")]
    InvalidPolicy { share: f64 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;

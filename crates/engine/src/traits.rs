//! Core traits for the recommendation engine.
//!
//! The orchestrator does not care how a user's raw taste vector is projected
//! onto the ingredient manifold, only that something does it. This module
//! defines that seam.

use crate::error::Result;
use catalog::TasteVector;

/// Maps a raw taste profile onto one consistent with a set of ingredients.
///
/// ## Design Note
/// - `Send + Sync` allows one reconstructor to serve concurrent requests
/// - Implementations must not keep state between calls: every call fits on
///   the profiles it is given
pub trait ProfileReconstructor: Send + Sync {
    /// Returns the name of this reconstructor (for logging/debugging)
    fn name(&self) -> &str;

    /// Fit on `ingredient_profiles` and reconstruct `query`.
    ///
    /// # Returns
    /// * `Ok(TasteVector)` - every coordinate in `[0, 1]`
    /// * `Err(InsufficientData)` - if `ingredient_profiles` is empty
    fn reconstruct(
        &self,
        ingredient_profiles: &[TasteVector],
        query: &TasteVector,
    ) -> Result<TasteVector>;
}

/// Skips reconstruction: the query is only clamped into `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl ProfileReconstructor for Passthrough {
    fn name(&self) -> &str {
        "Passthrough"
    }

    fn reconstruct(
        &self,
        ingredient_profiles: &[TasteVector],
        query: &TasteVector,
    ) -> Result<TasteVector> {
        if ingredient_profiles.is_empty() {
            return Err(crate::EngineError::InsufficientData {
                reason: "no ingredient profiles".to_string(),
            });
        }
        Ok(query.clamp_unit())
    }
}

//! Constrained Mixer - target taste profile to a concrete recipe
//!
//! ## Algorithm
//! 1. Least squares: find the minimum-norm `w` minimising `‖A·w − target‖²`,
//!    where column `j` of `A` is the taste of ingredient `j`
//! 2. Clip negative weights to zero
//! 3. Normalise to sum 1 (uniform `1/n` if everything was clipped)
//! 4. Keep the `k` largest weights, zero the rest, renormalise
//!    (uniform `1/k` over the kept entries if they sum to zero)
//! 5. Scale by the total volume
//! 6. Drop entries at or below `epsilon` ml, optionally padding with
//!    zero-volume entries (see [`ShortRecipePolicy`])
//!
//! Ties in step 4 go to the ingredient that comes first in the set's order,
//! which is the catalog's iteration order.

use crate::error::{EngineError, Result};
use crate::lstsq;
use catalog::{IngredientSet, TasteVector};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

/// Volumes at or below this many ml are left out of a recipe
pub const DEFAULT_VOLUME_EPSILON: f64 = 1e-6;

/// What to do when fewer than `k` ingredients end up with a real volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortRecipePolicy {
    /// Leave the recipe shorter than `k`
    #[default]
    Truncate,
    /// Fill up to `min(k, n)` entries with zero-volume ingredients, best
    /// ranked first
    PadWithZeros,
}

/// Mixer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixerConfig {
    pub epsilon: f64,
    pub short_recipe: ShortRecipePolicy,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_VOLUME_EPSILON,
            short_recipe: ShortRecipePolicy::Truncate,
        }
    }
}

impl MixerConfig {
    /// Configure the volume cut-off in ml (default: 1e-6)
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Configure short-recipe handling (default: truncate)
    pub fn with_short_recipe(mut self, policy: ShortRecipePolicy) -> Self {
        self.short_recipe = policy;
        self
    }
}

// =============================================================================
// Recipe
// =============================================================================

/// Ingredient name -> volume in ml
///
/// Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe {
    volumes: BTreeMap<String, f64>,
}

impl Recipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, volume: f64) {
        self.volumes.insert(name.into(), volume);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.volumes.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.volumes.contains_key(name)
    }

    /// Number of entries, zero-volume padding included
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Number of entries with a strictly positive volume
    pub fn active_count(&self) -> usize {
        self.volumes.values().filter(|v| **v > 0.0).count()
    }

    pub fn total_volume(&self) -> f64 {
        self.volumes.values().sum()
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.volumes.iter().map(|(name, volume)| (name.as_str(), *volume))
    }

    /// Entries sorted by volume, largest first (name order on ties)
    pub fn by_volume(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        entries
    }

    /// Copy with every volume rounded to `decimals` places (for display)
    pub fn rounded(&self, decimals: i32) -> Recipe {
        let factor = 10f64.powi(decimals);
        Recipe {
            volumes: self
                .volumes
                .iter()
                .map(|(name, volume)| (name.clone(), (volume * factor).round() / factor))
                .collect(),
        }
    }

    /// Move every entry of `other` into this recipe
    ///
    /// Volumes of an ingredient present in both are added up.
    pub fn merge(&mut self, other: Recipe) {
        for (name, volume) in other.volumes {
            *self.volumes.entry(name).or_insert(0.0) += volume;
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, volume) in self.by_volume() {
            writeln!(f, "  - {}: {:.2} ml", name, volume)?;
        }
        Ok(())
    }
}

// =============================================================================
// Mixing
// =============================================================================

/// Final proportions: `(ingredient name, weight)` in set order, zero weights
/// included
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixWeights {
    pub entries: Vec<(String, f64)>,
}

impl MixWeights {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, weight)| *weight)
    }

    /// Names of the non-zero entries, heaviest first
    pub fn ranking(&self) -> Vec<&str> {
        let mut active: Vec<&(String, f64)> =
            self.entries.iter().filter(|(_, w)| *w > 0.0).collect();
        active.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        active.into_iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Output of one mixing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mix {
    pub weights: MixWeights,
    pub recipe: Recipe,
    /// `min(k, n)`
    pub effective_k: usize,
}

/// Turns a target profile into a bounded, volume-scaled recipe
#[derive(Debug, Clone, Default)]
pub struct ConstrainedMixer {
    config: MixerConfig,
}

impl ConstrainedMixer {
    pub fn new(config: MixerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    /// Mix at most `k` ingredients of `set` into `total_volume` ml
    /// approximating `target`.
    ///
    /// # Errors
    /// * `EmptyCandidateSet` - `set` is empty
    /// * `InvalidK` - `k == 0`
    /// * `InvalidVolume` - `total_volume` is not a positive finite number
    #[instrument(skip(self, target, set), fields(pool = %set.pool(), n = set.len()))]
    pub fn mix(
        &self,
        target: &TasteVector,
        set: &IngredientSet<'_>,
        k: usize,
        total_volume: f64,
    ) -> Result<Mix> {
        if set.is_empty() {
            return Err(EngineError::EmptyCandidateSet { pool: set.pool() });
        }
        if k == 0 {
            return Err(EngineError::InvalidK { k });
        }
        if !total_volume.is_finite() || total_volume <= 0.0 {
            return Err(EngineError::InvalidVolume {
                volume: total_volume,
            });
        }

        let profiles = set.profiles();
        let raw = lstsq::solve_min_norm(&profiles, target);
        let effective_k = k.min(set.len());
        let weights = select_top_k(normalize(clip(raw)), effective_k);

        let names = set.names();
        let mut recipe = Recipe::new();
        for (name, weight) in names.iter().zip(&weights) {
            let volume = weight * total_volume;
            if volume > self.config.epsilon {
                recipe.insert(*name, volume);
            }
        }

        if self.config.short_recipe == ShortRecipePolicy::PadWithZeros {
            for idx in rank(&weights) {
                if recipe.len() >= effective_k {
                    break;
                }
                if !recipe.contains(names[idx]) {
                    recipe.insert(names[idx], 0.0);
                }
            }
        }

        debug!(
            "Mixed {} of {} ingredients into {:.1} ml",
            recipe.active_count(),
            set.len(),
            recipe.total_volume()
        );

        Ok(Mix {
            weights: MixWeights {
                entries: names
                    .iter()
                    .zip(weights)
                    .map(|(name, weight)| (name.to_string(), weight))
                    .collect(),
            },
            recipe,
            effective_k,
        })
    }
}

/// Non-negativity: negative proportions become zero
fn clip(weights: Vec<f64>) -> Vec<f64> {
    weights.into_iter().map(|w| w.max(0.0)).collect()
}

/// Scale to sum 1, or uniform if nothing is left
fn normalize(weights: Vec<f64>) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        weights.into_iter().map(|w| w / sum).collect()
    } else {
        let uniform = 1.0 / weights.len() as f64;
        vec![uniform; weights.len()]
    }
}

/// Indices ordered by weight, largest first; equal weights keep set order
fn rank(weights: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    // sort_by is stable, which is what gives the set-order tie-break
    order.sort_by(|&a, &b| {
        weights[b]
            .partial_cmp(&weights[a])
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Keep the `k` heaviest entries and renormalise them
fn select_top_k(weights: Vec<f64>, k: usize) -> Vec<f64> {
    if k >= weights.len() {
        return weights;
    }

    let keep = &rank(&weights)[..k];
    let mut selected = vec![0.0; weights.len()];
    for &idx in keep {
        selected[idx] = weights[idx];
    }

    let sum: f64 = selected.iter().sum();
    if sum > 0.0 {
        selected.iter_mut().for_each(|w| *w /= sum);
    } else {
        for &idx in keep {
            selected[idx] = 1.0 / k as f64;
        }
    }
    selected
}

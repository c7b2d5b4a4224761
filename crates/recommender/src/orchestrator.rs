//! # Recommendation Orchestrator
//!
//! Coordinates one recommendation:
//! 1. Validate the request (k, volume, policy)
//! 2. Pick the pools from the alcohol preference and policy
//! 3. Per pool: reconstruct the user's profile on that pool's ingredients
//! 4. Per pool: mix the reconstructed profile into its share of the volume
//! 5. Merge the sub-recipes and find the closest single ingredient
//!
//! The catalog is an immutable snapshot behind an `Arc`, so one orchestrator
//! can be cloned into as many threads as needed.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use catalog::{Catalog, Pool, TasteVector};
use engine::{
    Autoencoder, ConstrainedMixer, EngineError, MixWeights, MixerConfig, ProfileReconstructor,
    Recipe, UserProfile,
};

use crate::error::{RecommendError, Result};
use crate::policy::{plan_split, AlcoholPolicy, AlcoholPreference};

/// Drink volume used when the caller has no preference
pub const DEFAULT_TOTAL_VOLUME: f64 = 200.0;

/// One independently mixed part of a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMix {
    pub pool: Pool,
    /// Ingredient count this part was allowed
    pub requested: usize,
    /// Volume in ml this part was scaled to
    pub volume: f64,
    /// Profile after reconstruction on this pool
    pub profile: TasteVector,
    pub weights: MixWeights,
    pub recipe: Recipe,
}

/// Final recommendation returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Merged recipe over all sub-mixes
    pub recipe: Recipe,
    pub sub_mixes: Vec<SubMix>,
    /// Single ingredient whose taste is nearest the first reconstructed
    /// profile
    pub closest_ingredient: Option<String>,
}

impl Recommendation {
    pub fn total_volume(&self) -> f64 {
        self.recipe.total_volume()
    }
}

/// Main orchestrator that coordinates reconstruction and mixing
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    catalog: Arc<Catalog>,
    reconstructor: Arc<dyn ProfileReconstructor>,
    mixer: ConstrainedMixer,
    policy: AlcoholPolicy,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator with the autoencoder, the default mixer and the
    /// 30/70 split policy
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            reconstructor: Arc::new(Autoencoder::new()),
            mixer: ConstrainedMixer::default(),
            policy: AlcoholPolicy::default(),
        }
    }

    /// Use a different profile reconstructor
    pub fn with_reconstructor(mut self, reconstructor: impl ProfileReconstructor + 'static) -> Self {
        self.reconstructor = Arc::new(reconstructor);
        self
    }

    /// Configure how alcoholic requests are mixed (default: split 30/70)
    pub fn with_policy(mut self, policy: AlcoholPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Configure the mixer (epsilon, short-recipe handling)
    pub fn with_mixer_config(mut self, config: MixerConfig) -> Self {
        self.mixer = ConstrainedMixer::new(config);
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn policy(&self) -> AlcoholPolicy {
        self.policy
    }

    pub fn reconstructor_name(&self) -> &str {
        self.reconstructor.name()
    }

    /// Recommend a drink for a questionnaire profile
    pub fn recommend_for(
        &self,
        profile: &UserProfile,
        preference: AlcoholPreference,
        k: usize,
        total_volume: f64,
    ) -> Result<Recommendation> {
        self.recommend(&profile.taste, preference, k, total_volume)
    }

    /// Main entry point: recommend a drink of `total_volume` ml with at most
    /// `k` ingredients
    ///
    /// # Errors
    /// * `InvalidK` - `k == 0`
    /// * `InvalidVolume` - `total_volume` not positive and finite
    /// * `InvalidPolicy` - split share outside (0, 1)
    /// * `EmptyCandidateSet` - no ingredient in the pools the request needs
    /// * `InsufficientData` - reconstruction could not fit
    #[instrument(skip(self, taste), fields(policy = %self.policy))]
    pub fn recommend(
        &self,
        taste: &TasteVector,
        preference: AlcoholPreference,
        k: usize,
        total_volume: f64,
    ) -> Result<Recommendation> {
        let start_time = Instant::now();

        if k == 0 {
            return Err(EngineError::InvalidK { k }.into());
        }
        if !total_volume.is_finite() || total_volume <= 0.0 {
            return Err(EngineError::InvalidVolume {
                volume: total_volume,
            }
            .into());
        }
        self.policy.validate()?;

        let sub_mixes = match (preference, self.policy) {
            (AlcoholPreference::NonAlcoholic, _) => {
                vec![self.mix_pool(taste, Pool::NonAlcoholic, k, total_volume)?]
            }
            (AlcoholPreference::Alcoholic, AlcoholPolicy::Union) => {
                vec![self.mix_pool(taste, Pool::All, k, total_volume)?]
            }
            (AlcoholPreference::Alcoholic, AlcoholPolicy::Split { alcoholic_share }) => {
                self.mix_split(taste, k, total_volume, alcoholic_share)?
            }
        };

        let mut recipe = Recipe::new();
        for sub_mix in &sub_mixes {
            recipe.merge(sub_mix.recipe.clone());
        }

        let closest_ingredient = sub_mixes.first().and_then(|first| {
            let pool = pools_used(&sub_mixes);
            self.catalog
                .closest(&first.profile, pool)
                .map(|ingredient| ingredient.name.clone())
        });

        info!(
            "Recommended {} ingredients ({:.1} ml) in {:.2?}",
            recipe.active_count(),
            recipe.total_volume(),
            start_time.elapsed()
        );

        Ok(Recommendation {
            recipe,
            sub_mixes,
            closest_ingredient,
        })
    }

    /// Mix the alcoholic and non-alcoholic pools separately
    fn mix_split(
        &self,
        taste: &TasteVector,
        k: usize,
        total_volume: f64,
        alcoholic_share: f64,
    ) -> Result<Vec<SubMix>> {
        let available_alcoholic = self.catalog.pool_size(Pool::Alcoholic);
        let available_non_alcoholic = self.catalog.pool_size(Pool::NonAlcoholic);
        let plan = plan_split(k, alcoholic_share, available_alcoholic, available_non_alcoholic);

        debug!(
            "Split plan: {} alcoholic (of {}), {} non-alcoholic (of {})",
            plan.alcoholic, available_alcoholic, plan.non_alcoholic, available_non_alcoholic
        );

        let volumes = match (plan.alcoholic, plan.non_alcoholic) {
            (0, 0) => {
                let pool = if available_alcoholic == 0 {
                    Pool::Alcoholic
                } else {
                    Pool::NonAlcoholic
                };
                return Err(EngineError::EmptyCandidateSet { pool }.into());
            }
            (_, 0) => [total_volume, 0.0],
            (0, _) => [0.0, total_volume],
            _ => [
                total_volume * alcoholic_share,
                total_volume * (1.0 - alcoholic_share),
            ],
        };

        let mut sub_mixes = Vec::with_capacity(2);
        for (pool, volume) in [Pool::Alcoholic, Pool::NonAlcoholic].into_iter().zip(volumes) {
            let count = plan.count(pool);
            if count > 0 {
                sub_mixes.push(self.mix_pool(taste, pool, count, volume)?);
            }
        }
        Ok(sub_mixes)
    }

    /// Reconstruct and mix on one pool
    fn mix_pool(&self, taste: &TasteVector, pool: Pool, k: usize, volume: f64) -> Result<SubMix> {
        let set = self.catalog.pool(pool);
        if set.is_empty() {
            return Err(RecommendError::Engine(EngineError::EmptyCandidateSet { pool }));
        }

        let profile = self.reconstructor.reconstruct(&set.profiles(), taste)?;
        debug!("Reconstructed {} profile: {}", pool, profile);

        let mix = self.mixer.mix(&profile, &set, k, volume)?;

        Ok(SubMix {
            pool,
            requested: k,
            volume,
            profile,
            weights: mix.weights,
            recipe: mix.recipe,
        })
    }
}

/// The narrowest pool covering every sub-mix
fn pools_used(sub_mixes: &[SubMix]) -> Pool {
    match sub_mixes {
        [only] => only.pool,
        _ => Pool::All,
    }
}

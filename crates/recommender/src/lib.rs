//! Recommender crate for the mixology engine.
//!
//! This crate contains the orchestrator that turns a taste profile and an
//! alcohol preference into one merged recipe, and the policy deciding how an
//! alcoholic request is spread over spirits and mixers.

pub mod error;
pub mod policy;
pub mod orchestrator;

pub use error::{RecommendError, Result};
pub use policy::{plan_split, AlcoholPolicy, AlcoholPreference, SplitPlan, DEFAULT_ALCOHOLIC_SHARE};
pub use orchestrator::{Recommendation, RecommendationOrchestrator, SubMix, DEFAULT_TOTAL_VOLUME};

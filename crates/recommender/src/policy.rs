//! Alcohol preference and how an alcoholic request is spread over the pools.

use crate::error::{RecommendError, Result};
use catalog::Pool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Share of ingredients and volume given to the alcoholic side in split mode
pub const DEFAULT_ALCOHOLIC_SHARE: f64 = 0.3;

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlcoholPreference {
    Alcoholic,
    #[default]
    NonAlcoholic,
}

impl FromStr for AlcoholPreference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "alcoholic" => Ok(AlcoholPreference::Alcoholic),
            "n" | "non-alcoholic" | "non_alcoholic" => Ok(AlcoholPreference::NonAlcoholic),
            other => Err(format!("unknown alcohol preference '{}'", other)),
        }
    }
}

impl fmt::Display for AlcoholPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlcoholPreference::Alcoholic => write!(f, "alcoholic"),
            AlcoholPreference::NonAlcoholic => write!(f, "non-alcoholic"),
        }
    }
}

/// How an alcoholic request is mixed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum AlcoholPolicy {
    /// Two independent mixes, one per pool. The alcoholic side gets
    /// `alcoholic_share` of the volume and `max(1, round(share · k))` of the
    /// ingredients.
    Split { alcoholic_share: f64 },
    /// One mix over the whole catalog
    Union,
}

impl Default for AlcoholPolicy {
    fn default() -> Self {
        AlcoholPolicy::Split {
            alcoholic_share: DEFAULT_ALCOHOLIC_SHARE,
        }
    }
}

impl AlcoholPolicy {
    /// Split shares must lie strictly between 0 and 1
    pub fn validate(&self) -> Result<()> {
        match *self {
            AlcoholPolicy::Split { alcoholic_share }
                if !(alcoholic_share > 0.0 && alcoholic_share < 1.0) =>
            {
                Err(RecommendError::InvalidPolicy {
                    share: alcoholic_share,
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for AlcoholPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlcoholPolicy::Split { alcoholic_share } => {
                let alcoholic = alcoholic_share * 100.0;
                write!(f, "split {:.0}/{:.0}", alcoholic, 100.0 - alcoholic)
            }
            AlcoholPolicy::Union => write!(f, "union"),
        }
    }
}

/// Ingredient counts per side of a split mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPlan {
    pub alcoholic: usize,
    pub non_alcoholic: usize,
}

impl SplitPlan {
    pub fn total(&self) -> usize {
        self.alcoholic + self.non_alcoholic
    }

    pub fn count(&self, pool: Pool) -> usize {
        match pool {
            Pool::Alcoholic => self.alcoholic,
            Pool::NonAlcoholic => self.non_alcoholic,
            Pool::All => self.total(),
        }
    }
}

/// Spread `k` ingredients over the two pools
///
/// The alcoholic side asks for `max(1, round(share · k))`, the rest goes to
/// the non-alcoholic side. A side with fewer ingredients than it asks for
/// shrinks to what it has and hands the remainder to the other side, which
/// takes it up to its own availability.
pub fn plan_split(
    k: usize,
    alcoholic_share: f64,
    available_alcoholic: usize,
    available_non_alcoholic: usize,
) -> SplitPlan {
    if k == 0 {
        return SplitPlan {
            alcoholic: 0,
            non_alcoholic: 0,
        };
    }

    let wanted_alcoholic = ((alcoholic_share * k as f64).round() as usize).clamp(1, k);
    let wanted_non_alcoholic = k.saturating_sub(wanted_alcoholic);

    let alcoholic = wanted_alcoholic.min(available_alcoholic);
    let non_alcoholic = wanted_non_alcoholic.min(available_non_alcoholic);

    let spare_from_alcoholic = wanted_alcoholic - alcoholic;
    let spare_from_non_alcoholic = wanted_non_alcoholic - non_alcoholic;

    SplitPlan {
        alcoholic: (alcoholic + spare_from_non_alcoholic).min(available_alcoholic),
        non_alcoholic: (non_alcoholic + spare_from_alcoholic).min(available_non_alcoholic),
    }
}

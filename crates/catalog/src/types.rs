//! Core domain types for drink ingredients and taste questionnaires.
//!
//! The taste space is fixed: five named axes. Instead of passing bare
//! `[f64; 5]` arrays around, every vector is a [`TasteVector`] indexed by
//! [`TasteAxis`], so a catalog extension cannot silently swap two axes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

// =============================================================================
// Taste axes
// =============================================================================

/// Number of taste dimensions
pub const TASTE_DIMS: usize = 5;

/// One of the fixed taste dimensions
///
/// The declaration order is the positional order used in data files:
/// `[sweet, sour, bitter, fruity, spicy]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TasteAxis {
    Sweet,
    Sour,
    Bitter,
    Fruity,
    Spicy,
}

impl TasteAxis {
    /// All axes in positional order
    pub const ALL: [TasteAxis; TASTE_DIMS] = [
        TasteAxis::Sweet,
        TasteAxis::Sour,
        TasteAxis::Bitter,
        TasteAxis::Fruity,
        TasteAxis::Spicy,
    ];

    /// Position of this axis inside a [`TasteVector`]
    pub const fn index(self) -> usize {
        match self {
            TasteAxis::Sweet => 0,
            TasteAxis::Sour => 1,
            TasteAxis::Bitter => 2,
            TasteAxis::Fruity => 3,
            TasteAxis::Spicy => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TasteAxis::Sweet => "sweet",
            TasteAxis::Sour => "sour",
            TasteAxis::Bitter => "bitter",
            TasteAxis::Fruity => "fruity",
            TasteAxis::Spicy => "spicy",
        }
    }

    /// Look an axis up by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<TasteAxis> {
        let lowered = name.trim().to_lowercase();
        TasteAxis::ALL.into_iter().find(|axis| axis.name() == lowered)
    }
}

impl fmt::Display for TasteAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TasteVector
// =============================================================================

/// A point in taste space, one coordinate per [`TasteAxis`]
///
/// Coordinates are non-negative and nominally in `[0, 1]`; the upper bound is
/// not enforced. Serialized as a plain five-element array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TasteVector([f64; TASTE_DIMS]);

impl TasteVector {
    pub const fn new(values: [f64; TASTE_DIMS]) -> Self {
        Self(values)
    }

    pub const fn zeros() -> Self {
        Self([0.0; TASTE_DIMS])
    }

    /// Build a vector by evaluating `f` once per axis
    pub fn from_fn(mut f: impl FnMut(TasteAxis) -> f64) -> Self {
        let mut values = [0.0; TASTE_DIMS];
        for axis in TasteAxis::ALL {
            values[axis.index()] = f(axis);
        }
        Self(values)
    }

    pub fn get(&self, axis: TasteAxis) -> f64 {
        self.0[axis.index()]
    }

    pub fn set(&mut self, axis: TasteAxis, value: f64) {
        self.0[axis.index()] = value;
    }

    pub fn as_array(&self) -> &[f64; TASTE_DIMS] {
        &self.0
    }

    /// Iterate `(axis, value)` pairs in positional order
    pub fn iter(&self) -> impl Iterator<Item = (TasteAxis, f64)> + '_ {
        TasteAxis::ALL.into_iter().map(move |axis| (axis, self.get(axis)))
    }

    pub fn add_assign(&mut self, other: &TasteVector) {
        for (value, delta) in self.0.iter_mut().zip(other.0.iter()) {
            *value += delta;
        }
    }

    pub fn scale(&self, factor: f64) -> TasteVector {
        Self(self.0.map(|value| value * factor))
    }

    pub fn squared_distance(&self, other: &TasteVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Clamp every coordinate into `[0, 1]`
    pub fn clamp_unit(&self) -> TasteVector {
        Self(self.0.map(|value| value.clamp(0.0, 1.0)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|value| *value == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|value| value.is_finite())
    }
}

impl From<[f64; TASTE_DIMS]> for TasteVector {
    fn from(values: [f64; TASTE_DIMS]) -> Self {
        Self(values)
    }
}

impl Index<TasteAxis> for TasteVector {
    type Output = f64;

    fn index(&self, axis: TasteAxis) -> &f64 {
        &self.0[axis.index()]
    }
}

impl IndexMut<TasteAxis> for TasteVector {
    fn index_mut(&mut self, axis: TasteAxis) -> &mut f64 {
        &mut self.0[axis.index()]
    }
}

impl fmt::Display for TasteVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(axis, value)| format!("{} {:.2}", axis, value))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

// =============================================================================
// Ingredients
// =============================================================================

/// Drink ingredient with its taste signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique key inside a [`Catalog`]
    pub name: String,
    pub taste: TasteVector,
    pub alcoholic: bool,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, taste: impl Into<TasteVector>, alcoholic: bool) -> Self {
        Self {
            name: name.into(),
            taste: taste.into(),
            alcoholic,
        }
    }
}

/// Which part of the catalog an [`IngredientSet`] was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    Alcoholic,
    NonAlcoholic,
    /// Both kinds together
    All,
}

impl Pool {
    pub fn admits(self, ingredient: &Ingredient) -> bool {
        match self {
            Pool::Alcoholic => ingredient.alcoholic,
            Pool::NonAlcoholic => !ingredient.alcoholic,
            Pool::All => true,
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Pool::Alcoholic => "alcoholic",
            Pool::NonAlcoholic => "non-alcoholic",
            Pool::All => "all",
        };
        f.write_str(label)
    }
}

/// Ordered, borrowed working set of ingredients for one mixing call
///
/// Order follows the catalog's iteration order, which is what the mixer uses
/// to break ties between equal weights.
#[derive(Debug, Clone)]
pub struct IngredientSet<'a> {
    pool: Pool,
    ingredients: Vec<&'a Ingredient>,
}

impl<'a> IngredientSet<'a> {
    pub fn new(pool: Pool, ingredients: Vec<&'a Ingredient>) -> Self {
        Self { pool, ingredients }
    }

    pub fn pool(&self) -> Pool {
        self.pool
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Ingredient> + '_ {
        self.ingredients.iter().copied()
    }

    pub fn get(&self, position: usize) -> Option<&'a Ingredient> {
        self.ingredients.get(position).copied()
    }

    /// Taste vectors in set order (the rows of the n×5 profile matrix)
    pub fn profiles(&self) -> Vec<TasteVector> {
        self.ingredients.iter().map(|i| i.taste).collect()
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }
}

// =============================================================================
// Questionnaire
// =============================================================================

/// One side of a binary-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    /// Taste contribution added to the profile when this option is chosen
    pub taste: TasteVector,
}

/// Binary-choice question ("Milk or dark chocolate?")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub option_a: AnswerOption,
    pub option_b: AnswerOption,
}

/// Ordered list of questions shown to the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

// =============================================================================
// Catalog - immutable ingredient snapshot
// =============================================================================

/// All known ingredients, keyed by name, in a stable iteration order
///
/// A catalog is built once and then shared read-only (usually behind an
/// `Arc`) by every recommendation request.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) ingredients: Vec<Ingredient>,
    /// Name -> position in `ingredients`
    pub(crate) by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Creates a new, empty Catalog
    pub fn new() -> Self {
        Self {
            ingredients: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Ingredient> {
        self.by_name.get(name).map(|&idx| &self.ingredients[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Ingredients in catalog order
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    /// Build the working set for `pool`, preserving catalog order
    pub fn pool(&self, pool: Pool) -> IngredientSet<'_> {
        let members = self
            .ingredients
            .iter()
            .filter(|ingredient| pool.admits(ingredient))
            .collect();
        IngredientSet::new(pool, members)
    }

    /// Number of ingredients in `pool`
    pub fn pool_size(&self, pool: Pool) -> usize {
        self.ingredients.iter().filter(|i| pool.admits(i)).count()
    }

    /// Get counts for debugging/validation: (alcoholic, non-alcoholic)
    pub fn counts(&self) -> (usize, usize) {
        let alcoholic = self.pool_size(Pool::Alcoholic);
        (alcoholic, self.ingredients.len() - alcoholic)
    }
}

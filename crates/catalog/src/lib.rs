//! # Catalog Crate
//!
//! Ingredient and questionnaire data for the drink recommender.
//!
//! ## Main Components
//!
//! - **types**: Taste axes, taste vectors, ingredients, pools, questions
//! - **parser**: JSON files and free-text taste descriptions
//! - **index**: Catalog building, validation and directory loading
//! - **error**: Error types for catalog data
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{DataSet, Pool};
//! use std::path::Path;
//!
//! let data = DataSet::load_from_dir(Path::new("data"))?;
//! let mixers = data.catalog.pool(Pool::NonAlcoholic);
//!
//! println!("{} non-alcoholic ingredients", mixers.len());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use index::{DataSet, INGREDIENTS_FILE, QUESTIONS_FILE};
pub use types::{
    AnswerOption,
    Catalog,
    Ingredient,
    IngredientSet,
    Pool,
    Question,
    QuestionBank,
    TasteAxis,
    TasteVector,
    TASTE_DIMS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_creation() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.counts(), (0, 0));
    }

    #[test]
    fn test_axis_order_is_positional() {
        let taste = TasteVector::new([0.1, 0.2, 0.3, 0.4, 0.5]);

        assert_eq!(taste[TasteAxis::Sweet], 0.1);
        assert_eq!(taste[TasteAxis::Sour], 0.2);
        assert_eq!(taste[TasteAxis::Bitter], 0.3);
        assert_eq!(taste[TasteAxis::Fruity], 0.4);
        assert_eq!(taste[TasteAxis::Spicy], 0.5);
    }

    #[test]
    fn test_axis_names_round_trip() {
        for axis in TasteAxis::ALL {
            assert_eq!(TasteAxis::from_name(axis.name()), Some(axis));
        }
        assert_eq!(TasteAxis::from_name(" Fruity "), Some(TasteAxis::Fruity));
        assert_eq!(TasteAxis::from_name("salty"), None);
    }

    #[test]
    fn test_taste_vector_arithmetic() {
        let mut sum = TasteVector::zeros();
        sum.add_assign(&TasteVector::new([1.0, 0.0, 0.5, 0.0, 0.0]));
        sum.add_assign(&TasteVector::new([0.0, 1.0, 0.5, 0.0, 0.0]));

        let mean = sum.scale(0.5);
        assert_eq!(mean.as_array(), &[0.5, 0.5, 0.5, 0.0, 0.0]);
        assert!((mean.squared_distance(&TasteVector::zeros()) - 0.75).abs() < 1e-12);
        assert_eq!(
            TasteVector::new([1.5, -0.2, 0.3, 0.0, 0.0]).clamp_unit().as_array(),
            &[1.0, 0.0, 0.3, 0.0, 0.0]
        );
    }

    #[test]
    fn test_taste_vector_serializes_as_array() {
        let taste = TasteVector::new([0.5, 0.0, 0.25, 1.0, 0.0]);
        let json = serde_json::to_string(&taste).unwrap();
        assert_eq!(json, "[0.5,0.0,0.25,1.0,0.0]");
    }
}

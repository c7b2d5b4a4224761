//! Catalog building and validation.
//!
//! Turns parsed ingredient records into a [`Catalog`] snapshot, enforces the
//! data invariants (unique names, finite non-negative tastes) and loads a
//! whole data directory.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{debug, info};

/// File names expected inside a data directory
pub const INGREDIENTS_FILE: &str = "ingredients.json";
pub const QUESTIONS_FILE: &str = "questions.json";

impl Catalog {
    /// Build a catalog from ingredients, keeping their order
    ///
    /// Fails on duplicate names or invalid taste vectors.
    pub fn from_ingredients(ingredients: impl IntoIterator<Item = Ingredient>) -> Result<Self> {
        let mut catalog = Catalog::new();
        for ingredient in ingredients {
            catalog.insert(ingredient)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from the `ingredients.json` format
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_ingredients(parser::parse_ingredients_str(json, "inline")?)
    }

    /// Append an ingredient at the end of the iteration order
    ///
    /// The ingredient is checked the same way [`Catalog::validate`] checks
    /// the whole catalog, so a catalog built by inserting stays valid.
    pub fn insert(&mut self, ingredient: Ingredient) -> Result<()> {
        validate_ingredient(&ingredient)?;
        if self.by_name.contains_key(&ingredient.name) {
            return Err(CatalogError::DuplicateIngredient {
                name: ingredient.name,
            });
        }
        self.by_name
            .insert(ingredient.name.clone(), self.ingredients.len());
        self.ingredients.push(ingredient);
        Ok(())
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Names are non-empty
    /// - Every taste coordinate is finite and non-negative
    pub fn validate(&self) -> Result<()> {
        self.ingredients.iter().try_for_each(validate_ingredient)
    }

    /// Name of the ingredient whose taste is closest to `taste`
    /// (squared Euclidean distance), restricted to `pool`
    ///
    /// Ties go to the ingredient that comes first in catalog order.
    pub fn closest(&self, taste: &TasteVector, pool: Pool) -> Option<&Ingredient> {
        let mut best: Option<(&Ingredient, f64)> = None;
        for ingredient in self.ingredients.iter().filter(|i| pool.admits(i)) {
            let distance = ingredient.taste.squared_distance(taste);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((ingredient, distance)),
            }
        }
        best.map(|(ingredient, _)| ingredient)
    }
}

fn validate_ingredient(ingredient: &Ingredient) -> Result<()> {
    if ingredient.name.trim().is_empty() {
        return Err(CatalogError::ValidationError(
            "Ingredient with empty name".to_string(),
        ));
    }
    for (axis, value) in ingredient.taste.iter() {
        if !value.is_finite() || value < 0.0 {
            return Err(CatalogError::InvalidValue {
                field: format!("{}.{}", ingredient.name, axis),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

impl QuestionBank {
    /// Parse and validate a question bank from the `questions.json` format
    pub fn from_json_str(json: &str) -> Result<Self> {
        let bank = QuestionBank::new(parser::parse_questions_str(json, "inline")?);
        bank.validate()?;
        Ok(bank)
    }

    /// Every option must carry a finite, non-negative taste delta
    pub fn validate(&self) -> Result<()> {
        for (idx, question) in self.questions.iter().enumerate() {
            for option in [&question.option_a, &question.option_b] {
                let valid = option
                    .taste
                    .iter()
                    .all(|(_, value)| value.is_finite() && value >= 0.0);
                if !valid {
                    return Err(CatalogError::InvalidValue {
                        field: format!("question {} option '{}'", idx + 1, option.text),
                        value: option.taste.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Everything loaded from a data directory
#[derive(Debug, Clone)]
pub struct DataSet {
    pub catalog: Catalog,
    pub questions: QuestionBank,
}

impl DataSet {
    /// Load `ingredients.json` and `questions.json` from `data_dir`
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Build the catalog (duplicate check)
    /// 3. Validate tastes of ingredients and questions
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading drink data from {:?}", data_dir);

        let ingredients_path = data_dir.join(INGREDIENTS_FILE);
        let questions_path = data_dir.join(QUESTIONS_FILE);

        let (ingredients, questions) = rayon::join(
            || parser::parse_ingredients(&ingredients_path),
            || parser::parse_questions(&questions_path),
        );
        let ingredients = ingredients?;
        let questions = questions?;

        debug!(
            "Parsed {} ingredients and {} questions",
            ingredients.len(),
            questions.len()
        );

        let catalog = Catalog::from_ingredients(ingredients)?;
        let questions = QuestionBank::new(questions);
        questions.validate()?;

        let (alcoholic, non_alcoholic) = catalog.counts();
        info!(
            "Loaded {} ingredients ({} alcoholic, {} non-alcoholic) and {} questions",
            catalog.len(),
            alcoholic,
            non_alcoholic,
            questions.len()
        );

        Ok(Self { catalog, questions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_catalog() -> Catalog {
        Catalog::from_ingredients(vec![
            Ingredient::new("Gin", [0.2, 0.1, 0.7, 0.2, 0.8], true),
            Ingredient::new("Cola", [0.9, 0.1, 0.1, 0.1, 0.3], false),
            Ingredient::new("TonicWater", [0.1, 0.2, 0.1, 0.1, 0.1], false),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut catalog = sample_catalog();
        let err = catalog
            .insert(Ingredient::new("Gin", [0.0; 5], true))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateIngredient { .. }));
    }

    #[test]
    fn test_insert_rejects_invalid_ingredient() {
        let mut catalog = sample_catalog();

        let err = catalog
            .insert(Ingredient::new("Vinegar", [0.0, -0.5, 0.0, 0.0, 0.0], false))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidValue { .. }));

        let err = catalog
            .insert(Ingredient::new("Mystery", [f64::NAN, 0.0, 0.0, 0.0, 0.0], false))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidValue { .. }));

        let err = catalog
            .insert(Ingredient::new("  ", [0.1; 5], false))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ValidationError(_)));

        // Rejected ingredients leave the catalog untouched
        assert_eq!(catalog.len(), 3);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_negative_taste_rejected() {
        let result = Catalog::from_ingredients(vec![Ingredient::new(
            "Broken",
            [0.1, -0.2, 0.0, 0.0, 0.0],
            false,
        )]);
        assert!(matches!(result, Err(CatalogError::InvalidValue { .. })));
    }

    #[test]
    fn test_pools_keep_catalog_order() {
        let catalog = sample_catalog();

        let non_alcoholic = catalog.pool(Pool::NonAlcoholic);
        assert_eq!(non_alcoholic.names(), vec!["Cola", "TonicWater"]);

        let alcoholic = catalog.pool(Pool::Alcoholic);
        assert_eq!(alcoholic.names(), vec!["Gin"]);

        assert_eq!(catalog.pool(Pool::All).len(), 3);
        assert_eq!(catalog.counts(), (1, 2));
    }

    #[test]
    fn test_closest_ingredient() {
        let catalog = sample_catalog();
        let sweet = TasteVector::new([0.8, 0.1, 0.1, 0.1, 0.2]);

        assert_eq!(catalog.closest(&sweet, Pool::All).unwrap().name, "Cola");
        assert_eq!(catalog.closest(&sweet, Pool::Alcoholic).unwrap().name, "Gin");
        assert!(Catalog::new().closest(&sweet, Pool::All).is_none());
    }

    #[test]
    fn test_question_validation() {
        let json = r#"[
            {
                "prompt": "?",
                "option_a": { "text": "A", "taste": [0.1, 0.0, 0.0, 0.0, 0.0] },
                "option_b": { "text": "B", "taste": [0.0, 0.0, -1.0, 0.0, 0.0] }
            }
        ]"#;
        assert!(matches!(
            QuestionBank::from_json_str(json),
            Err(CatalogError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_dataset() {
        // Bundled data set at the workspace root
        let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data");

        if data_dir.exists() {
            let data = DataSet::load_from_dir(&data_dir).unwrap();
            let (alcoholic, non_alcoholic) = data.catalog.counts();

            assert!(alcoholic > 0);
            assert!(non_alcoholic > 0);
            assert!(!data.questions.is_empty());
        }
    }
}

//! Integration tests for the engine.
//!
//! These tests run the questionnaire, the reconstructor and the mixer
//! together on the bundled data set.

use catalog::{Catalog, DataSet, Ingredient, Pool, TasteVector};
use engine::{
    build_user_profile, parse_answers, Autoencoder, ConstrainedMixer, EngineError,
    ProfileReconstructor,
};
use std::path::Path;

fn load_bundled_data() -> DataSet {
    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    DataSet::load_from_dir(&data_dir).expect("bundled data should load")
}

fn create_scenario_catalog() -> Catalog {
    Catalog::from_ingredients(vec![
        Ingredient::new("Gin", [0.2, 0.1, 0.7, 0.2, 0.8], true),
        Ingredient::new("Cola", [0.9, 0.1, 0.1, 0.1, 0.3], false),
        Ingredient::new("TonicWater", [0.1, 0.2, 0.1, 0.1, 0.1], false),
    ])
    .unwrap()
}

#[test]
fn test_non_alcoholic_scenario_stays_in_pool() {
    let catalog = create_scenario_catalog();
    let set = catalog.pool(Pool::NonAlcoholic);
    let profile = TasteVector::new([0.5, 0.1, 0.3, 0.2, 0.4]);

    let target = Autoencoder::new()
        .reconstruct(&set.profiles(), &profile)
        .unwrap();
    let mix = ConstrainedMixer::default().mix(&target, &set, 2, 200.0).unwrap();

    assert_eq!(mix.recipe.len(), 2);
    for (name, volume) in mix.recipe.iter() {
        assert!(name == "Cola" || name == "TonicWater", "unexpected {}", name);
        assert!(volume > 0.0);
    }
    assert!((mix.recipe.total_volume() - 200.0).abs() < 1e-6);
    assert!(mix.recipe.get("Cola").unwrap() > mix.recipe.get("TonicWater").unwrap());
}

#[test]
fn test_questionnaire_to_recipe() {
    let data = load_bundled_data();
    let answers = parse_answers("1,2,1,2,1,2");
    let profile = build_user_profile(&data.questions, &answers);
    assert_eq!(profile.valid_answers, data.questions.len().min(answers.len()));

    let set = data.catalog.pool(Pool::NonAlcoholic);
    let target = Autoencoder::new()
        .reconstruct(&set.profiles(), &profile.taste)
        .unwrap();
    assert!(target.iter().all(|(_, v)| (0.0..=1.0).contains(&v)));

    let mix = ConstrainedMixer::default().mix(&target, &set, 3, 200.0).unwrap();
    assert!(mix.recipe.active_count() <= 3);
    assert!((mix.recipe.total_volume() - 200.0).abs() < 1e-6);
    for (name, _) in mix.recipe.iter() {
        let ingredient = data.catalog.get(name).unwrap();
        assert!(!ingredient.alcoholic);
    }
}

#[test]
fn test_skipped_questionnaire_still_mixes() {
    let data = load_bundled_data();
    let profile = build_user_profile(&data.questions, &parse_answers("x,,y"));
    assert!(profile.is_zero());

    let set = data.catalog.pool(Pool::Alcoholic);
    let target = Autoencoder::new()
        .reconstruct(&set.profiles(), &profile.taste)
        .unwrap();
    let mix = ConstrainedMixer::default().mix(&target, &set, 2, 60.0).unwrap();

    assert!(mix.recipe.active_count() >= 1);
    assert!(mix.recipe.active_count() <= 2);
    assert!((mix.recipe.total_volume() - 60.0).abs() < 1e-6);
}

#[test]
fn test_full_pipeline_is_deterministic() {
    let data = load_bundled_data();
    let set = data.catalog.pool(Pool::All);
    let profile = TasteVector::new([0.3, 0.6, 0.1, 0.7, 0.2]);
    let autoencoder = Autoencoder::new();
    let mixer = ConstrainedMixer::default();

    let run = || {
        let target = autoencoder.reconstruct(&set.profiles(), &profile).unwrap();
        mixer.mix(&target, &set, 4, 200.0).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.weights.ranking(), second.weights.ranking());
    assert_eq!(first.recipe, second.recipe);
}

#[test]
fn test_empty_pool_reports_error() {
    let catalog = Catalog::from_ingredients(vec![Ingredient::new(
        "Cola",
        [0.9, 0.1, 0.1, 0.1, 0.3],
        false,
    )])
    .unwrap();
    let set = catalog.pool(Pool::Alcoholic);

    assert!(matches!(
        Autoencoder::new().reconstruct(&set.profiles(), &TasteVector::zeros()),
        Err(EngineError::InsufficientData { .. })
    ));
    assert_eq!(
        ConstrainedMixer::default().mix(&TasteVector::zeros(), &set, 1, 200.0),
        Err(EngineError::EmptyCandidateSet { pool: Pool::Alcoholic })
    );
}

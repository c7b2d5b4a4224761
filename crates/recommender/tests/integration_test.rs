//! Integration tests for the recommender.
//!
//! These tests run whole recommendations against the bundled catalog and
//! question bank.

use catalog::{DataSet, Pool, TasteVector};
use engine::{build_user_profile, parse_answers};
use recommender::{
    AlcoholPolicy, AlcoholPreference, RecommendationOrchestrator, DEFAULT_TOTAL_VOLUME,
};
use std::path::Path;
use std::sync::Arc;
use std::thread;

fn create_test_setup() -> (DataSet, RecommendationOrchestrator) {
    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let data = DataSet::load_from_dir(&data_dir).expect("bundled data should load");
    let orchestrator = RecommendationOrchestrator::new(Arc::new(data.catalog.clone()));
    (data, orchestrator)
}

#[test]
fn test_questionnaire_to_alcoholic_recommendation() {
    let (data, orchestrator) = create_test_setup();
    let profile = build_user_profile(&data.questions, &parse_answers("1,1,2,1,2,2"));

    let rec = orchestrator
        .recommend_for(&profile, AlcoholPreference::Alcoholic, 10, DEFAULT_TOTAL_VOLUME)
        .unwrap();

    assert_eq!(rec.sub_mixes.len(), 2);
    assert_eq!(rec.sub_mixes[0].pool, Pool::Alcoholic);
    assert_eq!(rec.sub_mixes[0].requested, 3);
    assert!((rec.sub_mixes[0].recipe.total_volume() - 60.0).abs() < 1e-6);
    assert_eq!(rec.sub_mixes[1].requested, 7);
    assert!((rec.sub_mixes[1].recipe.total_volume() - 140.0).abs() < 1e-6);

    assert!((rec.total_volume() - 200.0).abs() < 1e-6);
    assert!(rec.recipe.active_count() <= 10);
    assert!(rec.closest_ingredient.is_some());

    for sub_mix in &rec.sub_mixes {
        assert!(sub_mix.profile.iter().all(|(_, v)| (0.0..=1.0).contains(&v)));
    }
}

#[test]
fn test_policies_differ_only_in_pools() {
    let (data, orchestrator) = create_test_setup();
    let taste = TasteVector::new([0.6, 0.3, 0.2, 0.7, 0.3]);

    let union = orchestrator
        .clone()
        .with_policy(AlcoholPolicy::Union)
        .recommend(&taste, AlcoholPreference::Alcoholic, 4, 300.0)
        .unwrap();
    assert_eq!(union.sub_mixes.len(), 1);
    assert_eq!(union.sub_mixes[0].pool, Pool::All);
    assert!((union.total_volume() - 300.0).abs() < 1e-6);

    let soft = orchestrator
        .recommend(&taste, AlcoholPreference::NonAlcoholic, 4, 300.0)
        .unwrap();
    for (name, _) in soft.recipe.iter() {
        assert!(!data.catalog.get(name).unwrap().alcoholic);
    }
}

#[test]
fn test_concurrent_requests_share_catalog() {
    let (_, orchestrator) = create_test_setup();
    let taste = TasteVector::new([0.4, 0.4, 0.1, 0.6, 0.2]);

    let expected = orchestrator
        .recommend(&taste, AlcoholPreference::Alcoholic, 3, 200.0)
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let orchestrator = orchestrator.clone();
            thread::spawn(move || {
                orchestrator
                    .recommend(&taste, AlcoholPreference::Alcoholic, 3, 200.0)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

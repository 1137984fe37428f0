// Integration tests for NutriScan
use nutriscan::prelude::*;
use nutriscan::load_products;
use std::path::PathBuf;

fn feed_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("products.json")
}

fn context() -> AskContext {
    let raw = load_products(feed_path()).unwrap();
    AskContext::bootstrap(raw, IndexConfig::default(), RouterConfig::default()).unwrap()
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_sample_feed_grades() {
    let ctx = context();
    assert_eq!(ctx.store().count(), 4);

    let passata = ctx.store().get("8000500310427").unwrap();
    assert_eq!(passata.nutrition.points, -6);
    assert_eq!(passata.nutrition.grade, Grade::A);

    let spread = ctx.store().get("3017620422003").unwrap();
    assert_eq!(spread.nutrition.negative_points, 26);
    assert_eq!(spread.nutrition.positive_points, 3);
    assert_eq!(spread.nutrition.grade, Grade::E);

    for product in ctx.store().products() {
        assert_eq!(product.ecology.points, 50.0);
        assert_eq!(product.ecology.grade, Grade::C);
        assert_eq!(product.ecology.confidence, 0.5);
    }
}

#[test]
fn test_vegan_scenario() {
    let ctx = context();
    let answer = ctx.ask("Is this vegan?", &ids(&["737628064502"])).unwrap();
    assert_eq!(answer.answer, "Yes, it is vegan.");
    assert_eq!(answer.citations, ids(&["737628064502"]));
}

#[test]
fn test_compare_scenario() {
    let raw = vec![
        RawProduct::new("x", "Plain yogurt").with_nutrients(NutrientProfile {
            sugars: 4.0,
            saturated_fat: 2.0,
            sodium_mg: 50.0,
            ..Default::default()
        }),
        RawProduct::new("y", "Vanilla yogurt").with_nutrients(NutrientProfile {
            sugars: 12.0,
            saturated_fat: 2.0,
            sodium_mg: 50.0,
            ..Default::default()
        }),
    ];
    let ctx = AskContext::bootstrap(raw, IndexConfig::default(), RouterConfig::default()).unwrap();

    let answer = ctx.ask("compare x and y", &ids(&["x", "y"])).unwrap();
    let first_clause = answer.answer.split("; ").next().unwrap();
    assert_eq!(first_clause, "Plain yogurt has less sugar (4 vs 12 g/100g)");
    assert_eq!(answer.citations, ids(&["x", "y"]));
}

#[test]
fn test_allergen_scenario() {
    let ctx = context();
    let answer = ctx.ask("Any allergens?", &ids(&["3017620422003"])).unwrap();
    assert_eq!(answer.answer, "Allergens: milk, nuts, soy.");

    let answer = ctx.ask("allergens", &ids(&["8000500310427"])).unwrap();
    assert_eq!(answer.answer, "No known allergens.");
}

#[test]
fn test_unmatched_query_cites_existing_products() {
    let ctx = context();
    let answer = ctx.ask("something with hazelnuts and cocoa", &[]).unwrap();
    assert_eq!(answer.intent, Intent::Similar);
    assert_eq!(answer.citations.len(), 3);
    assert_eq!(answer.citations[0], "3017620422003");
    for id in &answer.citations {
        assert!(ctx.store().contains(id));
    }
}

#[test]
fn test_error_kinds() {
    let ctx = context();
    let err = ctx.ask("vegan?", &ids(&["000"])).unwrap_err();
    assert_eq!(err.kind(), nutriscan::ErrorKind::NotFound);

    let err = ctx.ask("compare", &ids(&["737628064502"])).unwrap_err();
    assert_eq!(err.kind(), nutriscan::ErrorKind::BadRequest);

    let err = RetrievalIndex::build(&[], IndexConfig::default()).unwrap_err();
    assert_eq!(err.kind(), nutriscan::ErrorKind::EmptyCorpus);
}

#[test]
fn test_store_compare_partial() {
    let ctx = context();
    let result = ctx.store().compare("737628064502", "unknown");
    assert!(result["737628064502"].is_some());
    assert!(result["unknown"].is_none());
}

#[test]
fn test_rehydrated_index_answers_identically() {
    let ctx = context();
    let built = ctx.index().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let snapshots = IndexSnapshotStore::new(dir.path()).unwrap();
    snapshots.save(built).unwrap();
    let loaded = snapshots.load().unwrap().unwrap();

    for query in ["peanut noodles", "organic tomatoes", "chocolate milk", "nothing relevant"] {
        assert_eq!(built.search(query, 4), loaded.search(query, 4));
    }

    let store = ProductStore::from_raw(load_products(feed_path()).unwrap()).unwrap();
    let rehydrated = AskContext::new(store, Some(loaded), RouterConfig::default());
    assert_eq!(
        rehydrated.ask("crunchy peanut snack", &[]).unwrap(),
        ctx.ask("crunchy peanut snack", &[]).unwrap()
    );
}

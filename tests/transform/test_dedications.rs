#[path = "../common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use true_archetype::core::dedication::{self, DedicationMapping};
use true_archetype::core::item::{ItemDocument, RuleDefinition};
use true_archetype::core::store::{DocumentStore, SettingsStore};
use true_archetype::core::types::ErrorCategory;

fn strip_ids(docs: Vec<ItemDocument>) -> Vec<ItemDocument> {
    docs.into_iter()
        .map(|mut doc| {
            doc.id.clear();
            doc
        })
        .collect()
}

#[tokio::test]
async fn test_fighter_dedication_becomes_true_archetype() {
    let store = seeded_store().await;
    let config = config();

    let run = dedication::regenerate(&store, &store, &config).await.unwrap();

    assert_eq!(run.processed(), 2);
    let fighter = by_name(&store, WORKING_DEDICATIONS, "True Archetype: Fighter").await;
    assert_eq!(fighter.slug(), "true-archetype-fighter");
    assert_eq!(fighter.system.category.as_deref(), Some("truearchetype"));
    assert_eq!(fighter.level(), 1);
    assert!(fighter.system.prerequisites.value.is_empty());
    assert!(fighter.has_trait("trueArchetype"));
    assert!(fighter.has_trait("multiclass"));
    assert!(!fighter.has_trait("dedication"));
    assert!(!fighter.has_trait("archetype"));
    assert_eq!(
        fighter.system.rules.last(),
        Some(&RuleDefinition::roll_option("true-archetype", "fighter"))
    );
    assert_eq!(run.mapping.get("fighterDed000001"), Some(fighter.id.as_str()));
}

#[tokio::test]
async fn test_clone_keeps_untyped_fields() {
    let store = seeded_store().await;

    dedication::regenerate(&store, &store, &config()).await.unwrap();

    let wizard = by_name(&store, WORKING_DEDICATIONS, "True Archetype: Wizard").await;
    let raw = wizard.to_value().unwrap();
    assert_eq!(raw["img"], json!("icons/feat.webp"));
    assert_eq!(raw["system"]["traits"]["rarity"], json!("common"));
    assert_eq!(
        raw["system"]["publication"]["title"],
        json!("Pathfinder Player Core")
    );
}

#[tokio::test]
async fn test_only_multiclass_dedications_are_cloned() {
    let store = seeded_store().await;

    dedication::regenerate(&store, &store, &config()).await.unwrap();

    assert_eq!(
        names(&store, WORKING_DEDICATIONS).await,
        vec!["True Archetype: Fighter", "True Archetype: Wizard"]
    );
}

#[tokio::test]
async fn test_mapping_is_persisted_and_points_at_clones() {
    let store = seeded_store().await;
    let config = config();

    dedication::regenerate(&store, &store, &config).await.unwrap();

    let mapping = DedicationMapping::load(&store, &config.settings)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mapping.len(), 2);
    let working = key(WORKING_DEDICATIONS);
    for original in ["fighterDed000001", "wizardDed0000001"] {
        let clone_id = mapping.get(original).unwrap();
        assert!(store.get_document(&working, clone_id).await.unwrap().is_some());
    }

    let raw = store
        .get("true-archetype", "devDedicationMap")
        .await
        .unwrap()
        .unwrap();
    assert!(raw.is_object());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let store = seeded_store().await;
    let config = config();

    let first = dedication::regenerate(&store, &store, &config).await.unwrap();
    let first_docs = documents(&store, WORKING_DEDICATIONS).await;
    let second = dedication::regenerate(&store, &store, &config).await.unwrap();
    let second_docs = documents(&store, WORKING_DEDICATIONS).await;

    let first_keys: Vec<&str> = first.mapping.original_ids().collect();
    let second_keys: Vec<&str> = second.mapping.original_ids().collect();
    assert_eq!(first_keys, second_keys);
    assert_eq!(second_docs.len(), 2);

    assert_eq!(strip_ids(first_docs), strip_ids(second_docs));
}

#[tokio::test]
async fn test_source_catalog_is_not_modified() {
    let store = seeded_store().await;

    dedication::regenerate(&store, &store, &config()).await.unwrap();

    assert_eq!(documents(&store, SOURCE).await, catalog());
}

#[tokio::test]
async fn test_missing_source_aborts_before_touching_working_collection() {
    let store = true_archetype::core::store::MemoryStore::new();
    store
        .insert_collection(
            spec(WORKING_DEDICATIONS, "Temporary True Archetype Dedications"),
            vec![feat("keepMe0000000001", "Leftover", 1, &[], &[])],
        )
        .await;

    let err = dedication::regenerate(&store, &store, &config())
        .await
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::MissingCollection);
    assert!(err.message.contains(SOURCE));
    assert_eq!(names(&store, WORKING_DEDICATIONS).await, vec!["Leftover"]);
    assert!(store
        .get("true-archetype", "devDedicationMap")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_missing_working_collection_is_created() {
    let store = seeded_store().await;
    let working = key(WORKING_DEDICATIONS);
    assert!(store.collection(&working).await.unwrap().is_none());

    dedication::regenerate(&store, &store, &config()).await.unwrap();

    let info = store.collection(&working).await.unwrap().unwrap();
    assert_eq!(info.label, "Temporary True Archetype Dedications");
    assert_eq!(info.size, 2);
}

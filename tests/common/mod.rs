#![allow(dead_code)]

use serde_json::{json, Value};
use true_archetype::core::config::TrueArchetypeConfig;
use true_archetype::core::item::ItemDocument;
use true_archetype::core::store::{CollectionKey, CollectionSpec, DocumentStore, MemoryStore};

pub const SOURCE: &str = "pf2e.feats-srd";
pub const WORKING_DEDICATIONS: &str = "world.temporary-true-archetype-dedications";
pub const WORKING_FEATS: &str = "world.temporary-true-archetype-feats";
pub const PUBLISHED_DEDICATIONS: &str = "true-archetype.true-archetype-dedications";
pub const PUBLISHED_FEATS: &str = "true-archetype.true-archetype-feats";

pub fn key(raw: &str) -> CollectionKey {
    raw.parse().unwrap()
}

pub fn spec(raw: &str, label: &str) -> CollectionSpec {
    let key = key(raw);
    CollectionSpec {
        label: label.to_string(),
        name: key.name,
        package: key.package,
        item_kind: "Item".to_string(),
    }
}

pub fn feat(id: &str, name: &str, level: i64, traits: &[&str], prerequisites: &[&str]) -> ItemDocument {
    feat_with(id, name, level, traits, prerequisites, json!([]), "")
}

pub fn feat_with(
    id: &str,
    name: &str,
    level: i64,
    traits: &[&str],
    prerequisites: &[&str],
    rules: Value,
    description: &str,
) -> ItemDocument {
    let slug = name.to_lowercase().replace(' ', "-");
    let lines: Vec<Value> = prerequisites.iter().map(|p| json!({ "value": p })).collect();
    serde_json::from_value(json!({
        "_id": id,
        "name": name,
        "type": "feat",
        "img": "icons/feat.webp",
        "system": {
            "slug": slug,
            "category": "class",
            "level": { "value": level },
            "traits": { "value": traits, "rarity": "common" },
            "prerequisites": { "value": lines },
            "rules": rules,
            "description": { "value": description },
            "publication": { "title": "Pathfinder Player Core" }
        }
    }))
    .unwrap()
}

pub fn class_feat_grant_rules() -> Value {
    json!([
        {
            "key": "ChoiceSet",
            "flag": "classFeat",
            "prompt": "PF2E.SpecificRule.Prompt.LevelOneOrTwoClassFeat",
            "choices": {
                "filter": ["item:trait:fighter", "item:category:class", { "lte": ["item:level", 2] }]
            }
        },
        {
            "key": "GrantItem",
            "uuid": "{item|flags.pf2e.rulesSelections.classFeat}"
        }
    ])
}

/// Small slice of the feat catalog.
///
/// Chain: Fighter Dedication <- Basic Maneuver <- Advanced Maneuver <-
/// Diverse Maneuver <- Deep Maneuver. Deep Maneuver sits three hops past the
/// seed and must stay out of the selection.
pub fn catalog() -> Vec<ItemDocument> {
    vec![
        feat(
            "fighterDed000001",
            "Fighter Dedication",
            2,
            &["archetype", "dedication", "multiclass"],
            &["Strength +2", "Dexterity +2"],
        ),
        feat(
            "wizardDed0000001",
            "Wizard Dedication",
            2,
            &["archetype", "dedication", "multiclass"],
            &["Intelligence +2"],
        ),
        feat(
            "sentinelDed00001",
            "Sentinel Dedication",
            2,
            &["archetype", "dedication"],
            &[],
        ),
        feat_with(
            "basicManeuver001",
            "Basic Maneuver",
            4,
            &["archetype"],
            &["Fighter Dedication"],
            class_feat_grant_rules(),
            "You gain a 1st- or 2nd-level fighter feat.",
        ),
        feat_with(
            "advManeuver00001",
            "Advanced Maneuver",
            6,
            &["archetype"],
            &["Basic Maneuver"],
            json!([{ "key": "Note", "text": "own rule" }]),
            "You gain a fighter feat of up to half your level.",
        ),
        feat("diverseManeuver1", "Diverse Maneuver", 12, &["archetype"], &["Advanced Maneuver"]),
        feat("deepManeuver0001", "Deep Maneuver", 16, &["archetype"], &["Diverse Maneuver"]),
        feat(
            "arcaneSchool0001",
            "Arcane School Spell",
            4,
            &["archetype"],
            &["Wizard Dedication"],
        ),
        feat("steelSkin0000001", "Steel Skin", 4, &["archetype"], &["Sentinel Dedication"]),
        feat("shieldBlock00001", "Shield Block", 1, &["general", "skill"], &[]),
    ]
}

pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert_collection(spec(SOURCE, "Class Feats"), catalog())
        .await;
    store
}

/// Seeded store plus the two empty published collections.
pub async fn seeded_store_with_published() -> MemoryStore {
    let store = seeded_store().await;
    store
        .insert_collection(spec(PUBLISHED_DEDICATIONS, "True Archetype Dedications"), vec![])
        .await;
    store
        .insert_collection(spec(PUBLISHED_FEATS, "True Archetype Feats"), vec![])
        .await;
    store
}

pub fn config() -> TrueArchetypeConfig {
    TrueArchetypeConfig::default()
}

pub async fn documents(store: &MemoryStore, raw: &str) -> Vec<ItemDocument> {
    store.get_documents(&key(raw)).await.unwrap()
}

pub async fn by_name(store: &MemoryStore, raw: &str, name: &str) -> ItemDocument {
    documents(store, raw)
        .await
        .into_iter()
        .find(|doc| doc.name == name)
        .unwrap_or_else(|| panic!("{} not found in {}", name, raw))
}

pub async fn names(store: &MemoryStore, raw: &str) -> Vec<String> {
    let mut names: Vec<String> = documents(store, raw)
        .await
        .into_iter()
        .map(|doc| doc.name)
        .collect();
    names.sort();
    names
}

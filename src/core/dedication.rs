//! Dedication transformer.
//!
//! Clones every multiclass dedication of the source catalog into the working
//! dedication collection as a level 1 "True Archetype: <Class>" feat, and
//! persists the original id -> clone id mapping for the feat transformer.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::config::{SettingsConfig, TrueArchetypeConfig};
use crate::core::error::AppError;
use crate::core::item::{ItemDocument, RuleDefinition};
use crate::core::store::{DocumentStore, SettingsStore};
use crate::core::types::ErrorCategory;
use crate::core::working::{
    fetch_documents, parse_key, prepare_working_collection, require_collection,
};

pub const NAME_PREFIX: &str = "True Archetype: ";
pub const SLUG_PREFIX: &str = "true-archetype-";
pub const CATEGORY: &str = "truearchetype";
pub const ROLL_OPTION_DOMAIN: &str = "true-archetype";
pub const WORKING_LABEL: &str = "Temporary True Archetype Dedications";

pub const DEDICATION_TRAIT: &str = "dedication";
pub const MULTICLASS_TRAIT: &str = "multiclass";
pub const ARCHETYPE_TRAIT: &str = "archetype";
pub const TRUE_ARCHETYPE_TRAIT: &str = "trueArchetype";

const TRAITS_FIELD: &str = "system.traits.value";

/// Original dedication id -> id of its True Archetype clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedicationMapping(pub IndexMap<String, String>);

impl DedicationMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original_id: String, clone_id: String) {
        self.0.insert(original_id, clone_id);
    }

    pub fn get(&self, original_id: &str) -> Option<&str> {
        self.0.get(original_id).map(String::as_str)
    }

    pub fn original_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read the persisted mapping; `None` when the setting was never written.
    pub async fn load(
        settings: &dyn SettingsStore,
        keys: &SettingsConfig,
    ) -> Result<Option<Self>, AppError> {
        let Some(raw) = settings
            .get(&keys.namespace, &keys.dedication_map_key)
            .await?
        else {
            return Ok(None);
        };
        if raw.is_null() {
            return Ok(None);
        }
        let mapping = serde_json::from_value(raw).map_err(|e| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!(
                    "Stored {}.{} is not an id map: {}",
                    keys.namespace, keys.dedication_map_key, e
                ),
            )
        })?;
        Ok(Some(mapping))
    }

    /// Overwrite the persisted mapping wholesale.
    pub async fn save(
        &self,
        settings: &dyn SettingsStore,
        keys: &SettingsConfig,
    ) -> Result<(), AppError> {
        let value = serde_json::to_value(self)?;
        settings
            .set(&keys.namespace, &keys.dedication_map_key, value)
            .await?;
        Ok(())
    }
}

/// Result of one dedication run.
#[derive(Debug, Clone)]
pub struct DedicationRun {
    pub mapping: DedicationMapping,
}

impl DedicationRun {
    pub fn processed(&self) -> usize {
        self.mapping.len()
    }
}

fn dedication_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(.*)\s+Dedication$").expect("valid dedication regex"))
}

fn non_word_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid slug regex"))
}

/// "Fighter Dedication" -> "Fighter". Names without the suffix are only trimmed.
pub fn base_class_name(name: &str) -> String {
    dedication_suffix()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map_or(name, |m| m.as_str())
        .trim()
        .to_string()
}

/// Lower-case, collapse non-word runs into `-`, trim dangling hyphens.
pub fn slugify(value: &str) -> String {
    non_word_run()
        .replace_all(&value.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Display name of the clone of dedication `name`.
pub fn true_archetype_name(name: &str) -> String {
    format!("{}{}", NAME_PREFIX, base_class_name(name))
}

pub fn is_multiclass_dedication<S: AsRef<str>>(traits: &[S]) -> bool {
    let has = |tag: &str| traits.iter().any(|t| t.as_ref() == tag);
    has(DEDICATION_TRAIT) && has(MULTICLASS_TRAIT)
}

/// Rewrite a cloned dedication in place. Returns the roll option it registers.
pub fn rewrite_dedication(doc: &mut ItemDocument) -> String {
    let base = base_class_name(&doc.name);
    let option = slugify(&base);

    doc.name = format!("{}{}", NAME_PREFIX, base);
    doc.system.slug = Some(format!("{}{}", SLUG_PREFIX, option));
    doc.system.category = Some(CATEGORY.to_string());
    doc.system.level.value = 1;
    doc.system.prerequisites.value.clear();
    doc.retag(
        &[DEDICATION_TRAIT, ARCHETYPE_TRAIT],
        &[TRUE_ARCHETYPE_TRAIT, MULTICLASS_TRAIT],
    );
    doc.system
        .rules
        .push(RuleDefinition::roll_option(ROLL_OPTION_DOMAIN, &option));

    option
}

/// Rebuild the working dedication collection from the source catalog.
pub async fn regenerate(
    documents: &dyn DocumentStore,
    settings: &dyn SettingsStore,
    config: &TrueArchetypeConfig,
) -> Result<DedicationRun, AppError> {
    let source = parse_key(&config.collections.source)?;
    let working = parse_key(&config.collections.working_dedications)?;

    require_collection(documents, &source).await?;
    prepare_working_collection(documents, &working, WORKING_LABEL).await?;

    let index = documents.get_index(&source, &[TRAITS_FIELD]).await?;
    let dedications: Vec<_> = index
        .iter()
        .filter(|entry| is_multiclass_dedication(&entry.traits()))
        .collect();
    tracing::info!(
        source = %source,
        indexed = index.len(),
        matched = dedications.len(),
        "selected multiclass dedications"
    );

    let originals =
        fetch_documents(documents, &source, dedications.iter().map(|entry| &entry.id)).await?;
    let mut clones = documents.import_documents(&working, &originals).await?;

    let mut mapping = DedicationMapping::new();
    for (clone, original) in clones.iter_mut().zip(&originals) {
        let option = rewrite_dedication(clone);
        tracing::debug!(
            original = %original.id,
            clone = %clone.id,
            name = %clone.name,
            option = %option,
            "cloned dedication"
        );
        mapping.insert(original.id.clone(), clone.id.clone());
    }
    documents.update_documents(&working, &clones).await?;

    mapping.save(settings, &config.settings).await?;
    Ok(DedicationRun { mapping })
}

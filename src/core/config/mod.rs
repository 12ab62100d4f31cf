pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

use crate::core::types::ContentKind;
use serde::{Deserialize, Serialize};

/// Extra propagation rounds after the seed round when selecting feats.
pub const DEFAULT_MAX_EXTRA_HOPS: usize = 2;

/// Main configuration loaded from true-archetype.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrueArchetypeConfig {
    /// Collection keys
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Settings store keys
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Feat selection tuning
    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Collection keys, all in `<package>.<name>` form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// Catalog the transformers read from
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default = "default_working_dedications")]
    pub working_dedications: String,

    #[serde(default = "default_published_dedications")]
    pub published_dedications: String,

    #[serde(default = "default_working_feats")]
    pub working_feats: String,

    #[serde(default = "default_published_feats")]
    pub published_feats: String,
}

/// Settings store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Key holding the original -> cloned dedication id map
    #[serde(default = "default_dedication_map_key")]
    pub dedication_map_key: String,

    /// Key holding the feature toggle
    #[serde(default = "default_enabled_key")]
    pub enabled_key: String,
}

/// Feat selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_max_extra_hops")]
    pub max_extra_hops: usize,
}

// Default functions
fn default_source() -> String {
    "pf2e.feats-srd".to_string()
}

fn default_working_dedications() -> String {
    "world.temporary-true-archetype-dedications".to_string()
}

fn default_published_dedications() -> String {
    "true-archetype.true-archetype-dedications".to_string()
}

fn default_working_feats() -> String {
    "world.temporary-true-archetype-feats".to_string()
}

fn default_published_feats() -> String {
    "true-archetype.true-archetype-feats".to_string()
}

fn default_namespace() -> String {
    "true-archetype".to_string()
}

fn default_dedication_map_key() -> String {
    "devDedicationMap".to_string()
}

fn default_enabled_key() -> String {
    "isEnabled".to_string()
}

fn default_max_extra_hops() -> usize {
    DEFAULT_MAX_EXTRA_HOPS
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        CollectionsConfig {
            source: default_source(),
            working_dedications: default_working_dedications(),
            published_dedications: default_published_dedications(),
            working_feats: default_working_feats(),
            published_feats: default_published_feats(),
        }
    }
}

impl CollectionsConfig {
    /// `(working, published)` keys for one kind of content.
    pub fn pair(&self, kind: ContentKind) -> (&str, &str) {
        match kind {
            ContentKind::Dedications => (&self.working_dedications, &self.published_dedications),
            ContentKind::Feats => (&self.working_feats, &self.published_feats),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        SettingsConfig {
            namespace: default_namespace(),
            dedication_map_key: default_dedication_map_key(),
            enabled_key: default_enabled_key(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            max_extra_hops: default_max_extra_hops(),
        }
    }
}

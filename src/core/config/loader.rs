#![allow(clippy::result_large_err)] // Loader returns AppError so config failures carry a category and recovery hints.

use super::TrueArchetypeConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::Path;

/// File name looked up in the data directory.
pub const CONFIG_FILE_NAME: &str = "true-archetype.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from the data directory (data_dir/true-archetype.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults + env vars
    pub fn load_from_data_dir(data_dir: &Path) -> Result<TrueArchetypeConfig, AppError> {
        Self::load(&data_dir.join(CONFIG_FILE_NAME))
    }

    /// Load config from an explicit path, then apply env overrides.
    pub fn load(path: &Path) -> Result<TrueArchetypeConfig, AppError> {
        let mut config = Self::load_from_file(path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<TrueArchetypeConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: TrueArchetypeConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut TrueArchetypeConfig) {
        // Collection overrides
        if let Ok(source) = env::var("TRUE_ARCHETYPE_SOURCE") {
            config.collections.source = source;
        }

        if let Ok(key) = env::var("TRUE_ARCHETYPE_WORKING_DEDICATIONS") {
            config.collections.working_dedications = key;
        }

        if let Ok(key) = env::var("TRUE_ARCHETYPE_PUBLISHED_DEDICATIONS") {
            config.collections.published_dedications = key;
        }

        if let Ok(key) = env::var("TRUE_ARCHETYPE_WORKING_FEATS") {
            config.collections.working_feats = key;
        }

        if let Ok(key) = env::var("TRUE_ARCHETYPE_PUBLISHED_FEATS") {
            config.collections.published_feats = key;
        }

        // Settings overrides
        if let Ok(namespace) = env::var("TRUE_ARCHETYPE_NAMESPACE") {
            config.settings.namespace = namespace;
        }

        // Selection overrides
        if let Ok(hops_str) = env::var("TRUE_ARCHETYPE_MAX_EXTRA_HOPS") {
            if let Ok(hops) = hops_str.parse::<usize>() {
                config.selection.max_extra_hops = hops;
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "TRUE_ARCHETYPE_SOURCE - Override the source catalog (default: pf2e.feats-srd)",
            "TRUE_ARCHETYPE_WORKING_DEDICATIONS - Override the working dedication collection",
            "TRUE_ARCHETYPE_PUBLISHED_DEDICATIONS - Override the published dedication collection",
            "TRUE_ARCHETYPE_WORKING_FEATS - Override the working feat collection",
            "TRUE_ARCHETYPE_PUBLISHED_FEATS - Override the published feat collection",
            "TRUE_ARCHETYPE_NAMESPACE - Override the settings namespace (default: true-archetype)",
            "TRUE_ARCHETYPE_MAX_EXTRA_HOPS - Override the prerequisite propagation rounds (default: 2)",
        ]
    }
}

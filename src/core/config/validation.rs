#![allow(clippy::result_large_err)] // Validation returns AppError for consistent diagnostics.

use super::TrueArchetypeConfig;
use crate::core::error::AppError;
use crate::core::store::CollectionKey;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &TrueArchetypeConfig) -> Result<(), AppError> {
        let collections = &config.collections;
        for (field, value) in [
            ("collections.source", &collections.source),
            ("collections.working_dedications", &collections.working_dedications),
            ("collections.published_dedications", &collections.published_dedications),
            ("collections.working_feats", &collections.working_feats),
            ("collections.published_feats", &collections.published_feats),
        ] {
            value.parse::<CollectionKey>().map_err(|e| {
                AppError::new(ErrorCategory::ValidationError, format!("{}: {}", field, e))
            })?;
        }

        // Promotion wipes the published side, so it must never alias a working or source collection
        for published in [
            &collections.published_dedications,
            &collections.published_feats,
        ] {
            if published == &collections.working_dedications
                || published == &collections.working_feats
                || published == &collections.source
            {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    format!(
                        "published collection {} must differ from the source and working collections",
                        published
                    ),
                ));
            }
        }

        if collections.working_dedications == collections.working_feats {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "collections.working_dedications and collections.working_feats must differ",
            ));
        }

        if config.settings.namespace.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "settings.namespace cannot be empty",
            ));
        }

        Ok(())
    }
}

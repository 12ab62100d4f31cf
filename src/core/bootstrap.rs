//! Startup hook: registers the character-sheet feat sections and fills the
//! published collections when they are still empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::config::SettingsConfig;
use crate::core::error::AppError;
use crate::core::service::TrueArchetype;
use crate::core::store::SettingsStore;
use crate::core::types::{ContentKind, ErrorCategory, RunStatus};
use crate::core::working::parse_key;
use crate::core::{dedication, feats};

pub const FEAT_SECTIONS_NAMESPACE: &str = "pf2e";
pub const FEAT_SECTIONS_KEY: &str = "campaignFeatSections";

/// One campaign feat section of the character sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatSection {
    pub id: String,
    pub label: String,
    pub supported: Vec<String>,
    pub slots: Vec<u32>,
}

/// The dedication slot at level 1 and the feat slots at every even level.
pub fn true_archetype_sections() -> Vec<FeatSection> {
    vec![
        FeatSection {
            id: dedication::CATEGORY.to_string(),
            label: "True Archetype".to_string(),
            supported: vec![dedication::CATEGORY.to_string()],
            slots: vec![1],
        },
        FeatSection {
            id: "truearchetypefeats".to_string(),
            label: "True Archetype Feats".to_string(),
            supported: vec![feats::CATEGORY.to_string()],
            slots: (1..=10).map(|n| n * 2).collect(),
        },
    ]
}

/// Feature toggle; an unset value counts as enabled.
pub async fn is_enabled(
    settings: &dyn SettingsStore,
    keys: &SettingsConfig,
) -> Result<bool, AppError> {
    match settings.get(&keys.namespace, &keys.enabled_key).await? {
        None | Some(Value::Null) => Ok(true),
        Some(Value::Bool(enabled)) => Ok(enabled),
        Some(other) => Err(AppError::new(
            ErrorCategory::ValidationError,
            format!(
                "{}.{} must be a boolean, found {}",
                keys.namespace, keys.enabled_key, other
            ),
        )),
    }
}

/// Append the True Archetype sections that are not registered yet. Sections
/// owned by others are kept untouched. Returns how many were added.
pub async fn register_feat_sections(settings: &dyn SettingsStore) -> Result<usize, AppError> {
    let mut sections = match settings.get(FEAT_SECTIONS_NAMESPACE, FEAT_SECTIONS_KEY).await? {
        Some(Value::Array(sections)) => sections,
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "{}.{} must be a list, found {}",
                    FEAT_SECTIONS_NAMESPACE, FEAT_SECTIONS_KEY, other
                ),
            ))
        }
    };

    let mut added = 0;
    for section in true_archetype_sections() {
        let registered = sections
            .iter()
            .any(|existing| existing.get("id").and_then(Value::as_str) == Some(section.id.as_str()));
        if registered {
            continue;
        }
        sections.push(serde_json::to_value(&section)?);
        added += 1;
    }

    if added > 0 {
        settings
            .set(FEAT_SECTIONS_NAMESPACE, FEAT_SECTIONS_KEY, Value::Array(sections))
            .await?;
    }
    Ok(added)
}

/// What a bootstrap pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub enabled: bool,
    pub sections_added: usize,
    pub dedications: RunStatus,
    pub feats: RunStatus,
}

impl BootstrapReport {
    fn disabled() -> Self {
        Self {
            enabled: false,
            sections_added: 0,
            dedications: RunStatus::Skipped,
            feats: RunStatus::Skipped,
        }
    }

    pub fn is_success(&self) -> bool {
        self.dedications.is_success() && self.feats.is_success()
    }
}

pub async fn bootstrap(app: &TrueArchetype) -> Result<BootstrapReport, AppError> {
    if !is_enabled(app.settings(), &app.config().settings).await? {
        tracing::info!("True Archetype is disabled, skipping bootstrap");
        return Ok(BootstrapReport::disabled());
    }

    let sections_added = register_feat_sections(app.settings()).await?;
    tracing::debug!(sections_added, "registered campaign feat sections");

    let dedications = ensure_populated(app, ContentKind::Dedications).await?;
    let feats = ensure_populated(app, ContentKind::Feats).await?;

    Ok(BootstrapReport {
        enabled: true,
        sections_added,
        dedications,
        feats,
    })
}

/// Regenerate and promote `kind` when its published collection is empty.
async fn ensure_populated(app: &TrueArchetype, kind: ContentKind) -> Result<RunStatus, AppError> {
    let (_, published) = app.config().collections.pair(kind);
    let key = parse_key(published)?;
    let documents = app.documents();

    let Some(info) = documents.collection(&key).await? else {
        tracing::warn!(collection = %key, "Could not find published collection");
        return Ok(RunStatus::Skipped);
    };
    if info.size > 0 {
        tracing::info!(collection = %key, size = info.size, "already populated, skipping");
        return Ok(RunStatus::Skipped);
    }

    tracing::info!(collection = %key, "published collection is empty, regenerating");
    if info.locked {
        documents.configure(&key, false).await?;
    }

    let statuses = app.refresh(kind, false).await;

    if info.locked {
        documents.configure(&key, true).await?;
    }

    let status = statuses
        .into_iter()
        .find(|status| !status.is_success())
        .unwrap_or(RunStatus::Completed { count: 0 });
    Ok(match status {
        RunStatus::Completed { .. } => {
            let count = documents.collection(&key).await?.map_or(0, |c| c.size);
            RunStatus::Completed { count }
        }
        other => other,
    })
}

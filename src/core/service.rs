//! Entry points driven by the CLI and by bootstrap.
//!
//! Transformers return `Result`s; this layer turns them into a [`RunStatus`],
//! reports failures through the [`Notifier`] and logs everything else.

use std::sync::Arc;

use crate::core::config::TrueArchetypeConfig;
use crate::core::error::AppError;
use crate::core::notify::Notifier;
use crate::core::store::{DocumentStore, SettingsStore};
use crate::core::types::{ContentKind, ErrorCategory, RunStatus};
use crate::core::working::parse_key;
use crate::core::{dedication, feats, promotion};

/// Handle bundling the host collaborators and the resolved configuration.
#[derive(Clone)]
pub struct TrueArchetype {
    documents: Arc<dyn DocumentStore>,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    config: TrueArchetypeConfig,
}

impl TrueArchetype {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        settings: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
        config: TrueArchetypeConfig,
    ) -> Self {
        Self {
            documents,
            settings,
            notifier,
            config,
        }
    }

    /// Use one store for both documents and settings.
    pub fn from_store<S>(store: S, notifier: Arc<dyn Notifier>, config: TrueArchetypeConfig) -> Self
    where
        S: DocumentStore + SettingsStore + 'static,
    {
        let store = Arc::new(store);
        let documents: Arc<dyn DocumentStore> = store.clone();
        let settings: Arc<dyn SettingsStore> = store;
        Self::new(documents, settings, notifier, config)
    }

    pub fn config(&self) -> &TrueArchetypeConfig {
        &self.config
    }

    pub fn documents(&self) -> &dyn DocumentStore {
        self.documents.as_ref()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub async fn regenerate_dedications(&self, interactive: bool) -> RunStatus {
        let result = dedication::regenerate(
            self.documents.as_ref(),
            self.settings.as_ref(),
            &self.config,
        )
        .await
        .map(|run| {
            let count = run.processed();
            (
                count,
                format!(
                    "Imported and processed {} Multiclass Dedications into True Archetypes.",
                    count
                ),
            )
        });
        self.conclude("regenerate-dedications", interactive, result)
    }

    pub async fn regenerate_feats(&self, interactive: bool) -> RunStatus {
        let result = feats::regenerate(
            self.documents.as_ref(),
            self.settings.as_ref(),
            &self.config,
        )
        .await
        .map(|run| {
            (
                run.imported,
                format!(
                    "Imported and processed {} Archetype Feats into {}.",
                    run.imported,
                    feats::WORKING_LABEL
                ),
            )
        });
        self.conclude("regenerate-feats", interactive, result)
    }

    pub async fn overwrite_dedications(&self, interactive: bool) -> RunStatus {
        self.overwrite(ContentKind::Dedications, interactive).await
    }

    pub async fn overwrite_feats(&self, interactive: bool) -> RunStatus {
        self.overwrite(ContentKind::Feats, interactive).await
    }

    /// Regenerate then promote one kind of content. Promotion is skipped when
    /// regeneration did not complete.
    pub async fn refresh(&self, kind: ContentKind, interactive: bool) -> Vec<RunStatus> {
        let regenerated = match kind {
            ContentKind::Dedications => self.regenerate_dedications(interactive).await,
            ContentKind::Feats => self.regenerate_feats(interactive).await,
        };
        if !regenerated.is_success() {
            return vec![regenerated];
        }
        let promoted = self.overwrite(kind, interactive).await;
        vec![regenerated, promoted]
    }

    /// Dedications then feats, each regenerated and promoted; stops at the
    /// first step that does not complete.
    pub async fn rebuild(&self, interactive: bool) -> Vec<RunStatus> {
        let mut statuses = self.refresh(ContentKind::Dedications, interactive).await;
        if statuses.iter().all(RunStatus::is_success) {
            statuses.extend(self.refresh(ContentKind::Feats, interactive).await);
        }
        statuses
    }

    async fn overwrite(&self, kind: ContentKind, interactive: bool) -> RunStatus {
        let (working, published) = self.config.collections.pair(kind);
        let operation = format!("overwrite-{}", kind);
        let result = async {
            let source = parse_key(working)?;
            let target = parse_key(published)?;
            let written = promotion::promote(self.documents.as_ref(), &source, &target).await?;
            Ok::<_, AppError>((written, format!("Overwrote {} documents in {}", written, target)))
        }
        .await;
        self.conclude(&operation, interactive, result)
    }

    fn conclude(
        &self,
        operation: &str,
        interactive: bool,
        result: Result<(usize, String), AppError>,
    ) -> RunStatus {
        match result {
            Ok((count, message)) => {
                tracing::info!(operation, count, "{}", message);
                if interactive {
                    self.notifier.info(&message);
                }
                RunStatus::Completed { count }
            }
            Err(mut error) => {
                error.add_context("operation", operation);
                self.notifier.report_error(&error);
                if error.aborted_before_mutation() {
                    tracing::warn!(
                        operation,
                        code = %error.code,
                        category = %error.category,
                        "{}",
                        error.message
                    );
                    RunStatus::Aborted {
                        category: error.category,
                    }
                } else {
                    tracing::error!(
                        operation,
                        code = %error.code,
                        category = %error.category,
                        "run failed part-way: {}",
                        error
                    );
                    RunStatus::Failed {
                        category: ErrorCategory::TransformFailure,
                    }
                }
            }
        }
    }
}

#[path = "../common/mod.rs"]
mod common;

use common::*;
use std::sync::Arc;
use true_archetype::core::notify::{NoticeLevel, RecordingNotifier};
use true_archetype::core::store::{DocumentStore, MemoryStore};
use true_archetype::core::types::{ErrorCategory, RunStatus};
use true_archetype::core::TrueArchetype;

fn service(store: &MemoryStore, notifier: Arc<RecordingNotifier>) -> TrueArchetype {
    TrueArchetype::from_store(store.clone(), notifier, config())
}

#[tokio::test]
async fn test_overwrite_replaces_published_dedications() {
    let store = seeded_store_with_published().await;
    store
        .create_documents(
            &key(PUBLISHED_DEDICATIONS),
            vec![feat("stale00000000001", "Stale Dedication", 1, &[], &[])],
        )
        .await
        .unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let app = service(&store, notifier.clone());

    assert_eq!(
        app.regenerate_dedications(true).await,
        RunStatus::Completed { count: 2 }
    );
    assert_eq!(
        app.overwrite_dedications(true).await,
        RunStatus::Completed { count: 2 }
    );

    let working = documents(&store, WORKING_DEDICATIONS).await;
    let published = documents(&store, PUBLISHED_DEDICATIONS).await;
    assert_eq!(published, working);
    assert_eq!(
        notifier.messages(NoticeLevel::Info),
        vec![
            "Imported and processed 2 Multiclass Dedications into True Archetypes.".to_string(),
            format!("Overwrote 2 documents in {}", PUBLISHED_DEDICATIONS),
        ]
    );
}

#[tokio::test]
async fn test_rebuild_publishes_both_collections() {
    let store = seeded_store_with_published().await;
    let app = service(&store, Arc::new(RecordingNotifier::new()));

    let statuses = app.rebuild(false).await;

    assert_eq!(
        statuses,
        vec![
            RunStatus::Completed { count: 2 },
            RunStatus::Completed { count: 2 },
            RunStatus::Completed { count: 4 },
            RunStatus::Completed { count: 4 },
        ]
    );
    assert_eq!(
        names(&store, PUBLISHED_FEATS).await,
        names(&store, WORKING_FEATS).await
    );
}

#[tokio::test]
async fn test_non_interactive_runs_only_report_errors() {
    let store = seeded_store_with_published().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let app = service(&store, notifier.clone());

    app.rebuild(false).await;

    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_missing_published_collection_aborts() {
    let store = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let app = service(&store, notifier.clone());
    app.regenerate_dedications(false).await;

    let status = app.overwrite_dedications(false).await;

    assert_eq!(
        status,
        RunStatus::Aborted {
            category: ErrorCategory::MissingCollection
        }
    );
    let errors = notifier.messages(NoticeLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(PUBLISHED_DEDICATIONS));
}

#[tokio::test]
async fn test_locked_target_fails_part_way() {
    let store = seeded_store_with_published().await;
    store.configure(&key(PUBLISHED_FEATS), true).await.unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let app = service(&store, notifier.clone());

    let statuses = app.rebuild(true).await;

    assert_eq!(
        statuses.last(),
        Some(&RunStatus::Failed {
            category: ErrorCategory::TransformFailure
        })
    );
    assert_eq!(statuses.len(), 4);
    assert_eq!(notifier.messages(NoticeLevel::Error).len(), 1);
    assert!(documents(&store, PUBLISHED_FEATS).await.is_empty());
}

#[tokio::test]
async fn test_feats_before_dedications_is_a_precondition_failure() {
    let store = seeded_store_with_published().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let app = service(&store, notifier.clone());

    let status = app.regenerate_feats(true).await;

    assert_eq!(
        status,
        RunStatus::Aborted {
            category: ErrorCategory::MissingPrecondition
        }
    );
    assert!(notifier.messages(NoticeLevel::Error)[0].contains("No dedication map found"));
}

//! Snapshot-replace of a published collection from its working collection.

use crate::core::error::AppError;
use crate::core::store::{CollectionKey, DocumentStore};
use crate::core::working::require_collection;

/// Replace every document of `target` with a copy of the documents in `source`.
///
/// Both collections must exist. Document ids are carried over unless the
/// target rejects them, so promoted items keep their working ids. Returns the
/// number of documents written.
pub async fn promote(
    documents: &dyn DocumentStore,
    source: &CollectionKey,
    target: &CollectionKey,
) -> Result<usize, AppError> {
    require_collection(documents, source).await?;
    require_collection(documents, target).await?;

    let existing: Vec<String> = documents
        .get_documents(target)
        .await?
        .into_iter()
        .map(|doc| doc.id)
        .collect();
    documents.delete_documents(target, &existing).await?;

    let fresh = documents.get_documents(source).await?;
    let created = documents.create_documents(target, fresh).await?;

    tracing::info!(
        source = %source,
        target = %target,
        removed = existing.len(),
        written = created.len(),
        "promoted working collection"
    );
    Ok(created.len())
}

#![allow(clippy::result_large_err)] // Key parsing returns AppError so callers can propagate it unchanged.

use std::collections::HashMap;

use crate::core::error::AppError;
use crate::core::item::ItemDocument;
use crate::core::store::{CollectionInfo, CollectionKey, CollectionSpec, DocumentStore, StoreError};

/// Item kind of every collection this crate creates.
pub const ITEM_KIND: &str = "Item";

pub fn parse_key(raw: &str) -> Result<CollectionKey, AppError> {
    raw.parse::<CollectionKey>().map_err(AppError::from)
}

/// Locate a collection or fail with a `MissingCollection` error.
pub async fn require_collection(
    documents: &dyn DocumentStore,
    key: &CollectionKey,
) -> Result<CollectionInfo, AppError> {
    documents
        .collection(key)
        .await?
        .ok_or_else(|| AppError::missing_collection(&key.to_string()))
}

/// Empty the working collection, creating it first when it does not exist.
pub async fn prepare_working_collection(
    documents: &dyn DocumentStore,
    key: &CollectionKey,
    label: &str,
) -> Result<CollectionInfo, AppError> {
    match documents.collection(key).await? {
        Some(info) => {
            let existing: Vec<String> = documents
                .get_documents(key)
                .await?
                .into_iter()
                .map(|doc| doc.id)
                .collect();
            if !existing.is_empty() {
                documents.delete_documents(key, &existing).await?;
            }
            tracing::debug!(collection = %key, removed = existing.len(), "cleared working collection");
            Ok(CollectionInfo { size: 0, ..info })
        }
        None => {
            let info = documents
                .create_collection(CollectionSpec {
                    label: label.to_string(),
                    name: key.name.clone(),
                    package: key.package.clone(),
                    item_kind: ITEM_KIND.to_string(),
                })
                .await?;
            tracing::info!(collection = %key, label, "created working collection");
            Ok(info)
        }
    }
}

/// Full documents for `ids`, in the order given, read with a single collection load.
pub async fn fetch_documents<'a, I>(
    documents: &dyn DocumentStore,
    key: &CollectionKey,
    ids: I,
) -> Result<Vec<ItemDocument>, AppError>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut by_id: HashMap<String, ItemDocument> = documents
        .get_documents(key)
        .await?
        .into_iter()
        .map(|doc| (doc.id.clone(), doc))
        .collect();
    ids.into_iter()
        .map(|id| {
            by_id.remove(id).ok_or_else(|| {
                AppError::from(StoreError::DocumentNotFound {
                    collection: key.to_string(),
                    id: id.clone(),
                })
            })
        })
        .collect()
}

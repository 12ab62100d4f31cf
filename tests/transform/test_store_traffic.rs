#[path = "../common/mod.rs"]
mod common;

use async_trait::async_trait;
use common::*;
use serde_json::Value;
use std::sync::Mutex;
use true_archetype::core::item::ItemDocument;
use true_archetype::core::store::{
    CollectionInfo, CollectionKey, CollectionSpec, DocumentStore, IndexEntry, MemoryStore,
    SettingsStore, StoreResult,
};
use true_archetype::core::{dedication, feats};

/// Memory store that records every document-store call as `(operation, collection)`.
struct CountingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl CountingStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, operation: &'static str, key: &CollectionKey) {
        self.calls.lock().unwrap().push((operation, key.to_string()));
    }

    fn count(&self, operation: &str, collection: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, key)| *op == operation && key == collection)
            .count()
    }

    fn total(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn collection(&self, key: &CollectionKey) -> StoreResult<Option<CollectionInfo>> {
        self.inner.collection(key).await
    }

    async fn create_collection(&self, spec: CollectionSpec) -> StoreResult<CollectionInfo> {
        self.record("create_collection", &spec.key());
        self.inner.create_collection(spec).await
    }

    async fn get_index(&self, key: &CollectionKey, fields: &[&str]) -> StoreResult<Vec<IndexEntry>> {
        self.record("get_index", key);
        self.inner.get_index(key, fields).await
    }

    async fn get_documents(&self, key: &CollectionKey) -> StoreResult<Vec<ItemDocument>> {
        self.record("get_documents", key);
        self.inner.get_documents(key).await
    }

    async fn get_document(&self, key: &CollectionKey, id: &str) -> StoreResult<Option<ItemDocument>> {
        self.record("get_document", key);
        self.inner.get_document(key, id).await
    }

    async fn import_document(&self, key: &CollectionKey, doc: &ItemDocument) -> StoreResult<ItemDocument> {
        self.record("import_document", key);
        self.inner.import_document(key, doc).await
    }

    async fn import_documents(
        &self,
        key: &CollectionKey,
        docs: &[ItemDocument],
    ) -> StoreResult<Vec<ItemDocument>> {
        self.record("import_documents", key);
        self.inner.import_documents(key, docs).await
    }

    async fn create_documents(
        &self,
        key: &CollectionKey,
        docs: Vec<ItemDocument>,
    ) -> StoreResult<Vec<ItemDocument>> {
        self.record("create_documents", key);
        self.inner.create_documents(key, docs).await
    }

    async fn update_document(&self, key: &CollectionKey, doc: &ItemDocument) -> StoreResult<()> {
        self.record("update_document", key);
        self.inner.update_document(key, doc).await
    }

    async fn update_documents(&self, key: &CollectionKey, docs: &[ItemDocument]) -> StoreResult<()> {
        self.record("update_documents", key);
        self.inner.update_documents(key, docs).await
    }

    async fn delete_document(&self, key: &CollectionKey, id: &str) -> StoreResult<()> {
        self.record("delete_document", key);
        self.inner.delete_document(key, id).await
    }

    async fn delete_documents(&self, key: &CollectionKey, ids: &[String]) -> StoreResult<()> {
        self.record("delete_documents", key);
        self.inner.delete_documents(key, ids).await
    }

    async fn configure(&self, key: &CollectionKey, locked: bool) -> StoreResult<()> {
        self.record("configure", key);
        self.inner.configure(key, locked).await
    }
}

#[async_trait]
impl SettingsStore for CountingStore {
    async fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<Value>> {
        self.inner.get(namespace, key).await
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> StoreResult<()> {
        self.inner.set(namespace, key, value).await
    }
}

fn assert_no_per_document_calls(store: &CountingStore) {
    for operation in [
        "get_document",
        "import_document",
        "update_document",
        "delete_document",
    ] {
        assert_eq!(store.total(operation), 0, "{} was called", operation);
    }
}

#[tokio::test]
async fn test_dedication_run_reads_catalog_once_and_writes_in_batches() {
    let store = CountingStore::new(seeded_store().await);

    dedication::regenerate(&store, &store, &config()).await.unwrap();

    assert_no_per_document_calls(&store);
    assert_eq!(store.count("get_documents", SOURCE), 1);
    assert_eq!(store.count("import_documents", WORKING_DEDICATIONS), 1);
    assert_eq!(store.count("update_documents", WORKING_DEDICATIONS), 1);
}

#[tokio::test]
async fn test_feat_run_reads_catalog_once_and_writes_in_batches() {
    let store = CountingStore::new(seeded_store().await);
    dedication::regenerate(&store, &store, &config()).await.unwrap();
    store.reset();

    let run = feats::regenerate(&store, &store, &config()).await.unwrap();

    assert_eq!(run.imported, 4);
    assert_no_per_document_calls(&store);
    assert_eq!(store.count("get_index", SOURCE), 1);
    assert_eq!(store.count("get_documents", SOURCE), 1);
    assert_eq!(store.count("import_documents", WORKING_FEATS), 1);
    assert_eq!(store.count("update_documents", WORKING_FEATS), 1);
}

#[tokio::test]
async fn test_rerun_clears_working_collection_in_one_call() {
    let store = CountingStore::new(seeded_store().await);
    dedication::regenerate(&store, &store, &config()).await.unwrap();
    feats::regenerate(&store, &store, &config()).await.unwrap();
    store.reset();

    feats::regenerate(&store, &store, &config()).await.unwrap();

    assert_no_per_document_calls(&store);
    assert_eq!(store.count("delete_documents", WORKING_FEATS), 1);
    assert_eq!(store.inner.get_documents(&key(WORKING_FEATS)).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_first_run_skips_clearing_new_collection() {
    let store = CountingStore::new(seeded_store().await);

    dedication::regenerate(&store, &store, &config()).await.unwrap();

    assert_eq!(store.count("create_collection", WORKING_DEDICATIONS), 1);
    assert_eq!(store.count("delete_documents", WORKING_DEDICATIONS), 0);
}

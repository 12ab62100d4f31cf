//! In-memory collection and settings store.
//!
//! Holds every collection behind a `tokio::sync::RwLock`. Used by tests and by
//! embedders that already have the catalog loaded.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{
    generate_id, CollectionInfo, CollectionKey, CollectionSpec, DocumentStore, IndexEntry,
    SettingsStore, StoreError, StoreResult,
};
use crate::core::item::ItemDocument;

/// One collection with its metadata, as held in memory and on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCollection {
    pub label: String,
    pub name: String,
    pub package: String,
    #[serde(default = "default_item_kind")]
    pub item_kind: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, with = "documents_as_list")]
    pub documents: IndexMap<String, ItemDocument>,
}

fn default_item_kind() -> String {
    "Item".to_string()
}

impl StoredCollection {
    pub fn from_spec(spec: CollectionSpec) -> Self {
        Self {
            label: spec.label,
            name: spec.name,
            package: spec.package,
            item_kind: spec.item_kind,
            locked: false,
            documents: IndexMap::new(),
        }
    }

    pub fn key(&self) -> CollectionKey {
        CollectionKey::new(self.package.clone(), self.name.clone())
    }

    pub fn info(&self) -> CollectionInfo {
        CollectionInfo {
            key: self.key(),
            label: self.label.clone(),
            item_kind: self.item_kind.clone(),
            locked: self.locked,
            size: self.documents.len(),
        }
    }

    pub fn index(&self, fields: &[&str]) -> StoreResult<Vec<IndexEntry>> {
        self.documents
            .values()
            .map(|doc| IndexEntry::project(doc, fields))
            .collect()
    }

    pub fn import(&mut self, doc: &ItemDocument) -> StoreResult<ItemDocument> {
        self.ensure_unlocked()?;
        let mut copy = doc.clone();
        copy.id = self.fresh_id();
        self.documents.insert(copy.id.clone(), copy.clone());
        Ok(copy)
    }

    pub fn create(&mut self, docs: Vec<ItemDocument>) -> StoreResult<Vec<ItemDocument>> {
        self.ensure_unlocked()?;
        let mut created = Vec::with_capacity(docs.len());
        for mut doc in docs {
            if doc.id.is_empty() || self.documents.contains_key(&doc.id) {
                doc.id = self.fresh_id();
            }
            self.documents.insert(doc.id.clone(), doc.clone());
            created.push(doc);
        }
        Ok(created)
    }

    pub fn import_all(&mut self, docs: &[ItemDocument]) -> StoreResult<Vec<ItemDocument>> {
        docs.iter().map(|doc| self.import(doc)).collect()
    }

    /// Replace every document or none: ids are checked before any slot changes.
    pub fn update_all(&mut self, docs: &[ItemDocument]) -> StoreResult<()> {
        self.ensure_unlocked()?;
        if let Some(missing) = docs.iter().find(|doc| !self.documents.contains_key(&doc.id)) {
            return Err(self.not_found(&missing.id));
        }
        for doc in docs {
            self.documents.insert(doc.id.clone(), doc.clone());
        }
        Ok(())
    }

    pub fn delete_all(&mut self, ids: &[String]) -> StoreResult<()> {
        self.ensure_unlocked()?;
        if let Some(missing) = ids.iter().find(|id| !self.documents.contains_key(id.as_str())) {
            return Err(self.not_found(missing));
        }
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.documents.retain(|id, _| !doomed.contains(id.as_str()));
        Ok(())
    }

    pub fn update(&mut self, doc: &ItemDocument) -> StoreResult<()> {
        self.ensure_unlocked()?;
        match self.documents.get_mut(&doc.id) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(())
            }
            None => Err(self.not_found(&doc.id)),
        }
    }

    pub fn delete(&mut self, id: &str) -> StoreResult<()> {
        self.ensure_unlocked()?;
        self.documents
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| self.not_found(id))
    }

    fn ensure_unlocked(&self) -> StoreResult<()> {
        if self.locked {
            return Err(StoreError::Locked(self.key().to_string()));
        }
        Ok(())
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::DocumentNotFound {
            collection: self.key().to_string(),
            id: id.to_string(),
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id();
            if !self.documents.contains_key(&id) {
                return id;
            }
        }
    }
}

mod documents_as_list {
    use super::generate_id;
    use crate::core::item::ItemDocument;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(docs: &IndexMap<String, ItemDocument>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(docs.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<String, ItemDocument>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<ItemDocument>::deserialize(deserializer)?;
        let mut docs = IndexMap::with_capacity(list.len());
        for mut doc in list {
            if doc.id.is_empty() || docs.contains_key(&doc.id) {
                doc.id = generate_id();
            }
            docs.insert(doc.id.clone(), doc);
        }
        Ok(docs)
    }
}

type SettingsMap = HashMap<String, Map<String, Value>>;

/// In-memory [`DocumentStore`] + [`SettingsStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<CollectionKey, StoredCollection>>>,
    settings: Arc<RwLock<SettingsMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with documents, replacing any previous one.
    pub async fn insert_collection(&self, spec: CollectionSpec, docs: Vec<ItemDocument>) {
        let mut collection = StoredCollection::from_spec(spec);
        for doc in docs {
            collection.documents.insert(doc.id.clone(), doc);
        }
        let mut collections = self.collections.write().await;
        collections.insert(collection.key(), collection);
    }

    async fn with_collection<T>(
        &self,
        key: &CollectionKey,
        f: impl FnOnce(&mut StoredCollection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(key)
            .ok_or_else(|| StoreError::CollectionNotFound(key.to_string()))?;
        f(collection)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn collection(&self, key: &CollectionKey) -> StoreResult<Option<CollectionInfo>> {
        let collections = self.collections.read().await;
        Ok(collections.get(key).map(StoredCollection::info))
    }

    async fn create_collection(&self, spec: CollectionSpec) -> StoreResult<CollectionInfo> {
        let mut collections = self.collections.write().await;
        let key = spec.key();
        if collections.contains_key(&key) {
            return Err(StoreError::CollectionExists(key.to_string()));
        }
        let collection = StoredCollection::from_spec(spec);
        let info = collection.info();
        collections.insert(key, collection);
        Ok(info)
    }

    async fn get_index(&self, key: &CollectionKey, fields: &[&str]) -> StoreResult<Vec<IndexEntry>> {
        self.with_collection(key, |c| c.index(fields)).await
    }

    async fn get_documents(&self, key: &CollectionKey) -> StoreResult<Vec<ItemDocument>> {
        self.with_collection(key, |c| Ok(c.documents.values().cloned().collect()))
            .await
    }

    async fn get_document(&self, key: &CollectionKey, id: &str) -> StoreResult<Option<ItemDocument>> {
        self.with_collection(key, |c| Ok(c.documents.get(id).cloned()))
            .await
    }

    async fn import_document(&self, key: &CollectionKey, doc: &ItemDocument) -> StoreResult<ItemDocument> {
        self.with_collection(key, |c| c.import(doc)).await
    }

    async fn create_documents(
        &self,
        key: &CollectionKey,
        docs: Vec<ItemDocument>,
    ) -> StoreResult<Vec<ItemDocument>> {
        self.with_collection(key, |c| c.create(docs)).await
    }

    async fn import_documents(
        &self,
        key: &CollectionKey,
        docs: &[ItemDocument],
    ) -> StoreResult<Vec<ItemDocument>> {
        self.with_collection(key, |c| c.import_all(docs)).await
    }

    async fn update_document(&self, key: &CollectionKey, doc: &ItemDocument) -> StoreResult<()> {
        self.with_collection(key, |c| c.update(doc)).await
    }

    async fn update_documents(&self, key: &CollectionKey, docs: &[ItemDocument]) -> StoreResult<()> {
        self.with_collection(key, |c| c.update_all(docs)).await
    }

    async fn delete_document(&self, key: &CollectionKey, id: &str) -> StoreResult<()> {
        self.with_collection(key, |c| c.delete(id)).await
    }

    async fn delete_documents(&self, key: &CollectionKey, ids: &[String]) -> StoreResult<()> {
        self.with_collection(key, |c| c.delete_all(ids)).await
    }

    async fn configure(&self, key: &CollectionKey, locked: bool) -> StoreResult<()> {
        self.with_collection(key, |c| {
            c.locked = locked;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<Value>> {
        let settings = self.settings.read().await;
        Ok(settings.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> StoreResult<()> {
        let mut settings = self.settings.write().await;
        settings
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }
}

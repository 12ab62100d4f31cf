//! File-backed collection and settings store.
//!
//! Layout under the data directory:
//!
//! ```text
//! <root>/packs/<package>/<name>.json   one collection (metadata + documents)
//! <root>/settings.json                 { "<namespace>": { "<key>": value } }
//! ```
//!
//! Every write replaces the whole file through a temp file + rename.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;

use super::memory::StoredCollection;
use super::{
    CollectionInfo, CollectionKey, CollectionSpec, DocumentStore, IndexEntry, SettingsStore,
    StoreError, StoreResult,
};
use crate::core::item::ItemDocument;

const PACKS_DIR: &str = "packs";
const SETTINGS_FILE: &str = "settings.json";

type SettingsMap = HashMap<String, Map<String, Value>>;

pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, key: &CollectionKey) -> PathBuf {
        self.root
            .join(PACKS_DIR)
            .join(&key.package)
            .join(format!("{}.json", key.name))
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    async fn load(&self, key: &CollectionKey) -> StoreResult<Option<StoredCollection>> {
        let path = self.collection_path(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    async fn load_existing(&self, key: &CollectionKey) -> StoreResult<StoredCollection> {
        self.load(key)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(key.to_string()))
    }

    async fn save(&self, collection: &StoredCollection) -> StoreResult<()> {
        let path = self.collection_path(&collection.key());
        let content = serde_json::to_vec_pretty(collection)?;
        atomic_write(&path, &content).await
    }

    async fn mutate<T>(
        &self,
        key: &CollectionKey,
        f: impl FnOnce(&mut StoredCollection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut collection = self.load_existing(key).await?;
        let result = f(&mut collection)?;
        self.save(&collection).await?;
        Ok(result)
    }

    async fn load_settings(&self) -> StoreResult<SettingsMap> {
        let path = self.settings_path();
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(SettingsMap::new()),
            Err(err) => Err(io_error(&path, err)),
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

async fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| io_error(parent, err))?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)
        .await
        .map_err(|err| io_error(&tmp_path, err))?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(|err| io_error(path, err))?;
    Ok(())
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn collection(&self, key: &CollectionKey) -> StoreResult<Option<CollectionInfo>> {
        Ok(self.load(key).await?.map(|c| c.info()))
    }

    async fn create_collection(&self, spec: CollectionSpec) -> StoreResult<CollectionInfo> {
        let key = spec.key();
        if self.load(&key).await?.is_some() {
            return Err(StoreError::CollectionExists(key.to_string()));
        }
        let collection = StoredCollection::from_spec(spec);
        self.save(&collection).await?;
        tracing::debug!(collection = %key, "created collection");
        Ok(collection.info())
    }

    async fn get_index(&self, key: &CollectionKey, fields: &[&str]) -> StoreResult<Vec<IndexEntry>> {
        self.load_existing(key).await?.index(fields)
    }

    async fn get_documents(&self, key: &CollectionKey) -> StoreResult<Vec<ItemDocument>> {
        Ok(self.load_existing(key).await?.documents.into_values().collect())
    }

    async fn get_document(&self, key: &CollectionKey, id: &str) -> StoreResult<Option<ItemDocument>> {
        Ok(self.load_existing(key).await?.documents.shift_remove(id))
    }

    async fn import_document(&self, key: &CollectionKey, doc: &ItemDocument) -> StoreResult<ItemDocument> {
        self.mutate(key, |c| c.import(doc)).await
    }

    async fn create_documents(
        &self,
        key: &CollectionKey,
        docs: Vec<ItemDocument>,
    ) -> StoreResult<Vec<ItemDocument>> {
        self.mutate(key, |c| c.create(docs)).await
    }

    async fn import_documents(
        &self,
        key: &CollectionKey,
        docs: &[ItemDocument],
    ) -> StoreResult<Vec<ItemDocument>> {
        self.mutate(key, |c| c.import_all(docs)).await
    }

    async fn update_document(&self, key: &CollectionKey, doc: &ItemDocument) -> StoreResult<()> {
        self.mutate(key, |c| c.update(doc)).await
    }

    async fn update_documents(&self, key: &CollectionKey, docs: &[ItemDocument]) -> StoreResult<()> {
        self.mutate(key, |c| c.update_all(docs)).await
    }

    async fn delete_document(&self, key: &CollectionKey, id: &str) -> StoreResult<()> {
        self.mutate(key, |c| c.delete(id)).await
    }

    async fn delete_documents(&self, key: &CollectionKey, ids: &[String]) -> StoreResult<()> {
        self.mutate(key, |c| c.delete_all(ids)).await
    }

    async fn configure(&self, key: &CollectionKey, locked: bool) -> StoreResult<()> {
        self.mutate(key, |c| {
            c.locked = locked;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SettingsStore for FsStore {
    async fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<Value>> {
        let settings = self.load_settings().await?;
        Ok(settings.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> StoreResult<()> {
        let mut settings = self.load_settings().await?;
        settings
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        let content = serde_json::to_vec_pretty(&settings)?;
        atomic_write(&self.settings_path(), &content).await
    }
}

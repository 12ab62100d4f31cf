//! Host collaborators: the document-collection store and the settings store.
//!
//! Collections are addressed by `<package>.<name>` keys such as
//! `pf2e.feats-srd` or `world.temporary-true-archetype-feats`.

use crate::core::item::ItemDocument;
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

/// Length of generated document ids.
pub const DOCUMENT_ID_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("collection already exists: {0}")]
    CollectionExists(String),

    #[error("document {id} not found in {collection}")]
    DocumentNotFound { collection: String, id: String },

    #[error("collection {0} is locked")]
    Locked(String),

    #[error("invalid collection key '{0}', expected <package>.<name>")]
    InvalidKey(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("i/o failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// `<package>.<name>` address of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionKey {
    pub package: String,
    pub name: String,
}

impl CollectionKey {
    pub fn new<T: Into<String>>(package: T, name: T) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl FromStr for CollectionKey {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('.') {
            Some((package, name)) if is_path_segment(package) && is_path_segment(name) => {
                Ok(CollectionKey::new(package, name))
            }
            _ => Err(StoreError::InvalidKey(value.to_string())),
        }
    }
}

/// Both halves of a key become file path components in [`FsStore`].
fn is_path_segment(part: &str) -> bool {
    !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\'])
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// Parameters for creating a new collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub label: String,
    pub name: String,
    pub package: String,
    pub item_kind: String,
}

impl CollectionSpec {
    pub fn key(&self) -> CollectionKey {
        CollectionKey::new(self.package.clone(), self.name.clone())
    }
}

/// Metadata of an existing collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub key: CollectionKey,
    pub label: String,
    pub item_kind: String,
    pub locked: bool,
    pub size: usize,
}

/// Index row: id, name and the requested field paths of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    pub fields: Value,
}

impl IndexEntry {
    /// Project dotted `fields` (e.g. `system.traits.value`) out of a document.
    pub fn project(doc: &ItemDocument, fields: &[&str]) -> StoreResult<Self> {
        let full = serde_json::to_value(doc)?;
        let mut projected = Value::Object(Map::new());
        for field in fields {
            let pointer = format!("/{}", field.replace('.', "/"));
            if let Some(found) = full.pointer(&pointer) {
                insert_path(&mut projected, field, found.clone());
            }
        }
        Ok(Self {
            id: doc.id.clone(),
            name: doc.name.clone(),
            fields: projected,
        })
    }

    /// Trait tags, when `system.traits.value` was requested.
    pub fn traits(&self) -> Vec<&str> {
        self.fields
            .pointer("/system/traits/value")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Prerequisite lines, when `system.prerequisites.value` was requested.
    pub fn prerequisites(&self) -> Vec<&str> {
        self.fields
            .pointer("/system/prerequisites/value")
            .and_then(Value::as_array)
            .map(|lines| {
                lines
                    .iter()
                    .filter_map(|line| line.get("value").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn slug(&self) -> Option<&str> {
        self.fields.pointer("/system/slug").and_then(Value::as_str)
    }
}

fn insert_path(target: &mut Value, dotted: &str, value: Value) {
    let segments: Vec<&str> = dotted.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut cursor = target;
    for segment in parents {
        cursor = match cursor {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }
    if let Value::Object(map) = cursor {
        map.insert(last.to_string(), value);
    }
}

/// Generate a host-style document id.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Document-collection store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Locate a collection; `None` when it does not exist.
    async fn collection(&self, key: &CollectionKey) -> StoreResult<Option<CollectionInfo>>;

    async fn create_collection(&self, spec: CollectionSpec) -> StoreResult<CollectionInfo>;

    /// Read `_id`, `name` and the given dotted field paths of every document.
    async fn get_index(&self, key: &CollectionKey, fields: &[&str]) -> StoreResult<Vec<IndexEntry>>;

    async fn get_documents(&self, key: &CollectionKey) -> StoreResult<Vec<ItemDocument>>;

    async fn get_document(&self, key: &CollectionKey, id: &str) -> StoreResult<Option<ItemDocument>>;

    /// Copy `doc` into the collection under a freshly generated id.
    async fn import_document(&self, key: &CollectionKey, doc: &ItemDocument) -> StoreResult<ItemDocument>;

    /// Copy every document under freshly generated ids in one write.
    async fn import_documents(
        &self,
        key: &CollectionKey,
        docs: &[ItemDocument],
    ) -> StoreResult<Vec<ItemDocument>>;

    /// Insert documents by value, keeping their ids unless empty or taken.
    async fn create_documents(
        &self,
        key: &CollectionKey,
        docs: Vec<ItemDocument>,
    ) -> StoreResult<Vec<ItemDocument>>;

    /// Replace the stored document with the same id.
    async fn update_document(&self, key: &CollectionKey, doc: &ItemDocument) -> StoreResult<()>;

    /// Replace the stored documents with matching ids in one write.
    async fn update_documents(&self, key: &CollectionKey, docs: &[ItemDocument]) -> StoreResult<()>;

    async fn delete_document(&self, key: &CollectionKey, id: &str) -> StoreResult<()>;

    /// Remove all listed documents in one write; fails without removing any
    /// when an id is unknown.
    async fn delete_documents(&self, key: &CollectionKey, ids: &[String]) -> StoreResult<()>;

    async fn configure(&self, key: &CollectionKey, locked: bool) -> StoreResult<()>;
}

/// Namespaced key-value settings store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<Value>>;

    async fn set(&self, namespace: &str, key: &str, value: Value) -> StoreResult<()>;
}

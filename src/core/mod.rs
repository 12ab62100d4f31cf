pub mod bootstrap;
pub mod config;
pub mod dedication;
pub mod error;
pub mod feats;
pub mod item;
pub mod matching;
pub mod notify;
pub mod promotion;
pub mod rule_splice;
pub mod service;
pub mod store;
pub mod types;
pub mod working;

pub use bootstrap::{bootstrap, BootstrapReport};
pub use config::{ConfigLoader, ConfigValidator, TrueArchetypeConfig};
pub use dedication::DedicationMapping;
pub use error::AppError;
pub use item::{ItemDocument, RuleDefinition};
pub use notify::{ConsoleNotifier, Notifier, RecordingNotifier};
pub use service::TrueArchetype;
pub use store::{CollectionKey, DocumentStore, FsStore, MemoryStore, SettingsStore, StoreError};
pub use types::*;

//! Item documents as stored in feat collections.
//!
//! Only the fields the transformers read or rewrite are typed. Everything else
//! is kept in `extra` maps so that a clone written back to a collection carries
//! the host document unchanged.

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Untyped remainder of a JSON object.
pub type Extra = Map<String, Value>;

/// Ordered set of trait tags.
pub type TraitSet = IndexSet<String>;

fn default_item_type() -> String {
    "feat".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDocument {
    #[serde(rename = "_id", default)]
    pub id: String,

    pub name: String,

    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,

    #[serde(default)]
    pub system: ItemSystem,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub level: LevelField,

    #[serde(default)]
    pub traits: TraitsField,

    #[serde(default)]
    pub prerequisites: PrerequisitesField,

    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<RuleDefinition>,

    #[serde(default)]
    pub description: DescriptionField,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: i64,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitsField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: TraitSet,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrerequisitesField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: Vec<Prerequisite>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// One free-text prerequisite line, e.g. `"Fighter Dedication"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prerequisite {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Prerequisite {
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self {
            value: value.into(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,

    #[serde(flatten)]
    pub extra: Extra,
}

impl ItemDocument {
    pub fn new<T: Into<String>>(id: T, name: T) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type: default_item_type(),
            system: ItemSystem::default(),
            extra: Extra::new(),
        }
    }

    pub fn has_trait(&self, tag: &str) -> bool {
        self.system.traits.value.contains(tag)
    }

    pub fn slug(&self) -> &str {
        self.system.slug.as_deref().unwrap_or_default()
    }

    pub fn level(&self) -> i64 {
        self.system.level.value
    }

    pub fn prerequisite_texts(&self) -> impl Iterator<Item = &str> {
        self.system
            .prerequisites
            .value
            .iter()
            .map(|p| p.value.as_str())
    }

    /// Remove every tag in `remove`, then append every tag in `add` not already present.
    pub fn retag(&mut self, remove: &[&str], add: &[&str]) {
        let traits = &mut self.system.traits.value;
        for tag in remove {
            traits.shift_remove(*tag);
        }
        for tag in add {
            traits.insert((*tag).to_string());
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// A rule element: a JSON object discriminated by its `key` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleDefinition(pub Extra);

impl RuleDefinition {
    pub fn new(key: &str) -> Self {
        let mut fields = Extra::new();
        fields.insert("key".to_string(), Value::String(key.to_string()));
        Self(fields)
    }

    /// `RollOption` rule registering `option` under `domain`.
    pub fn roll_option(domain: &str, option: &str) -> Self {
        Self::new("RollOption")
            .with("domain", Value::String(domain.to_string()))
            .with("option", Value::String(option.to_string()))
    }

    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.set(field, value);
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.str_field("key")
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.0.get_mut(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }
}

//! The compiled configuration handed to code generators.
//!
//! Sections that never appeared in the source are omitted from the
//! serialized output entirely. Maps are `BTreeMap` so JSON and YAML
//! exports are deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The normalized schema: one optional section per declaration kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Plugin configurations keyed by plugin path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<BTreeMap<String, Value>>,
    /// Imported file paths, surfaced verbatim for the external loader.
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub r#use: Option<Vec<String>>,
    /// Reusable configuration fragments keyed by prop name. Dropped from
    /// finalized output once references are inlined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop: Option<BTreeMap<String, Value>>,
    /// Enum variant maps keyed by enum name.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<BTreeMap<String, BTreeMap<String, Value>>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<BTreeMap<String, TypeConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<BTreeMap<String, TypeConfig>>,
}

/// A compiled type or model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeConfig {
    pub name: String,
    pub mutable: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    pub columns: Vec<Column>,
}

/// A compiled column, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "type")]
    pub r#type: String,
    pub name: String,
    pub required: bool,
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl SchemaConfig {
    /// Pretty-printed JSON export.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// YAML export.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

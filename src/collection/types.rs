use std::collections::BTreeMap;

use serde::Deserialize;

use crate::engine::RequestSpec;

/// A validated collection, ready to hand to the engine.
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: Option<String>,
    pub requests: Vec<RequestSpec>,
}

/// On-disk shape of a collection file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionFile {
    pub name: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, alias = "items")]
    pub requests: Vec<CollectionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionEntry {
    pub name: Option<String>,
    pub method: Option<String>,
    pub url: Option<String>,
    pub path: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: Option<BodyValue>,
}

/// Request body given either as raw text or as structured data that is sent
/// as compact JSON.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BodyValue {
    Text(String),
    Json(serde_json::Value),
}

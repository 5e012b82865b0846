//! Serde types matching platform API response documents.
//!
//! Attributes and relationships are kept as raw JSON maps; the client only
//! cares about identity (`type` + `id`) and the document envelope.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A typed, identified record returned by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(deserialize_with = "deserialize_id")]
  pub id: String,
  #[serde(default)]
  pub attributes: Map<String, Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relationships: Option<Map<String, Value>>,
}

impl Resource {
  pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      id: id.into(),
      attributes: Map::new(),
      relationships: None,
    }
  }

  pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
    self.attributes.insert(name.into(), value);
    self
  }

  pub fn attribute(&self, name: &str) -> Option<&Value> {
    self.attributes.get(name)
  }

  /// Identifier of the first resource linked under `relationship`, if any.
  pub fn related_id(&self, relationship: &str) -> Option<&str> {
    let data = self.relationships.as_ref()?.get(relationship)?.get("data")?;
    let linkage = match data {
      Value::Array(items) => items.first()?,
      other => other,
    };
    linkage.get("id").and_then(Value::as_str)
  }
}

/// Ids are strings on the wire, but some endpoints emit bare numbers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    other => Err(serde::de::Error::custom(format!(
      "expected string or number id, got {}",
      other
    ))),
  }
}

/// Primary data of a document: a single resource or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
  One(Resource),
  Many(Vec<Resource>),
}

impl PrimaryData {
  pub fn resources(&self) -> &[Resource] {
    match self {
      Self::One(resource) => std::slice::from_ref(resource),
      Self::Many(resources) => resources,
    }
  }
}

/// Top-level response envelope: `{ data, included? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument {
  pub data: PrimaryData,
  #[serde(default)]
  pub included: Vec<Resource>,
}

impl ResourceDocument {
  /// Every resource carried by the document, primary first.
  pub fn all_resources(&self) -> impl Iterator<Item = &Resource> {
    self.data.resources().iter().chain(self.included.iter())
  }
}

/// Response of a list/query endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCollection {
  #[serde(default)]
  pub data: Vec<Resource>,
  #[serde(default)]
  pub included: Vec<Resource>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub meta: Option<Value>,
}

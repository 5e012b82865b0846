use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One operation in a storage pipeline, in its wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StorageCommand {
  Get {
    key: String,
  },
  Set {
    key: String,
    value: Value,
  },
  /// Write only if nothing is stored under `key` yet.
  SetUnique {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(
      rename = "ifNotExists",
      default,
      skip_serializing_if = "Option::is_none"
    )]
    if_not_exists: Option<bool>,
  },
  /// Claim the next unused number in the sequence scoped to `key`.
  SetUniqueNum {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    increment: Option<i64>,
  },
  Unset {
    key: String,
  },
}

impl StorageCommand {
  pub fn key(&self) -> &str {
    match self {
      Self::Get { key }
      | Self::Set { key, .. }
      | Self::SetUnique { key, .. }
      | Self::SetUniqueNum { key, .. }
      | Self::Unset { key } => key,
    }
  }

  pub fn action(&self) -> &'static str {
    match self {
      Self::Get { .. } => "get",
      Self::Set { .. } => "set",
      Self::SetUnique { .. } => "set_unique",
      Self::SetUniqueNum { .. } => "set_unique_num",
      Self::Unset { .. } => "unset",
    }
  }
}

/// A stored key/value pair as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageItem {
  pub key: String,
  #[serde(default)]
  pub value: Value,
}

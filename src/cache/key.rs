//! Resource identity and the static type-alias table.

use std::collections::HashMap;
use std::fmt;

/// Cache key for a single resource load.
///
/// The include directive is part of the key: the same resource requested
/// with and without `include` occupies two slots, because the payload shapes
/// differ.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ResourceKey {
  pub kind: String,
  pub id: String,
  pub include: Option<String>,
}

impl ResourceKey {
  pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      id: id.into(),
      include: None,
    }
  }

  pub fn with_include(mut self, include: impl Into<String>) -> Self {
    self.include = Some(include.into());
    self
  }
}

impl fmt::Display for ResourceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.include {
      Some(include) => write!(f, "{}/{}?include={}", self.kind, self.id, include),
      None => write!(f, "{}/{}", self.kind, self.id),
    }
  }
}

/// Alias label -> canonical type, declared once at startup.
///
/// A resource arriving under either label is addressable under both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeAliases {
  canonical: HashMap<String, String>,
}

impl TypeAliases {
  pub fn new() -> Self {
    Self::default()
  }

  /// The aliases the platform is known to use.
  pub fn platform_defaults() -> Self {
    Self::new().with_alias("employee-screening-flows", "flows")
  }

  pub fn with_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
    self.canonical.insert(alias.into(), canonical.into());
    self
  }

  /// Resolve `kind` to its canonical label (itself if not an alias).
  ///
  /// Chained aliases are followed to the end. A cyclic table stops once every
  /// entry has been visited.
  pub fn canonical<'a>(&'a self, kind: &'a str) -> &'a str {
    let mut current = kind;
    for _ in 0..self.canonical.len() {
      match self.canonical.get(current) {
        Some(next) if next != current => current = next,
        _ => break,
      }
    }
    current
  }

  pub fn normalize(&self, key: &ResourceKey) -> ResourceKey {
    ResourceKey {
      kind: self.canonical(&key.kind).to_string(),
      id: key.id.clone(),
      include: key.include.clone(),
    }
  }
}

impl FromIterator<(String, String)> for TypeAliases {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self {
      canonical: iter.into_iter().collect(),
    }
  }
}

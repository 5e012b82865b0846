//! Cache storage backed by moka.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use tracing::trace;

use super::key::{ResourceKey, TypeAliases};
use crate::resource::Resource;

/// Optional bounds on the cache. Both unset means unbounded, never expiring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
  /// Maximum number of entries kept; entries beyond the bound are evicted.
  pub max_entries: Option<u64>,
  /// How long an entry lives after it was primed.
  pub ttl: Option<Duration>,
}

impl CacheConfig {
  pub fn unbounded() -> Self {
    Self::default()
  }

  pub fn with_max_entries(mut self, max_entries: u64) -> Self {
    self.max_entries = Some(max_entries);
    self
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = Some(ttl);
    self
  }
}

/// A single cached resource.
#[derive(Debug, Clone)]
pub struct CachedResource {
  pub resource: Arc<Resource>,
  /// When the entry was primed
  pub cached_at: DateTime<Utc>,
}

/// Identity -> resource map shared by the loader and the response absorber.
///
/// Keys are normalized through the alias table on every access, so one entry
/// answers to every label of its type. Clones share storage.
#[derive(Clone)]
pub struct ResourceCache {
  entries: Cache<ResourceKey, CachedResource>,
  aliases: Arc<TypeAliases>,
}

impl ResourceCache {
  pub fn new(aliases: TypeAliases, config: CacheConfig) -> Self {
    let mut builder = Cache::<ResourceKey, CachedResource>::builder();
    if let Some(max_entries) = config.max_entries {
      builder = builder.max_capacity(max_entries);
    }
    if let Some(ttl) = config.ttl {
      builder = builder.time_to_live(ttl);
    }

    Self {
      entries: builder.build(),
      aliases: Arc::new(aliases),
    }
  }

  pub fn aliases(&self) -> &TypeAliases {
    &self.aliases
  }

  pub fn get(&self, key: &ResourceKey) -> Option<Arc<Resource>> {
    self.get_entry(key).map(|entry| entry.resource)
  }

  pub fn get_entry(&self, key: &ResourceKey) -> Option<CachedResource> {
    self.entries.get(&self.aliases.normalize(key))
  }

  pub fn contains(&self, key: &ResourceKey) -> bool {
    self.entries.contains_key(&self.aliases.normalize(key))
  }

  /// Insert or overwrite the entry for `key`.
  pub fn prime(&self, key: &ResourceKey, resource: Arc<Resource>) {
    let key = self.aliases.normalize(key);
    trace!(%key, "priming cache");
    self.entries.insert(
      key,
      CachedResource {
        resource,
        cached_at: Utc::now(),
      },
    );
  }

  /// Prime `resource` under its own identity, without an include directive.
  pub fn prime_resource(&self, resource: Arc<Resource>) {
    let key = ResourceKey::new(resource.kind.clone(), resource.id.clone());
    self.prime(&key, resource);
  }

  pub fn invalidate(&self, key: &ResourceKey) {
    self.entries.invalidate(&self.aliases.normalize(key));
  }

  pub fn clear(&self) {
    self.entries.invalidate_all();
  }
}

impl Default for ResourceCache {
  fn default() -> Self {
    Self::new(TypeAliases::platform_defaults(), CacheConfig::unbounded())
  }
}

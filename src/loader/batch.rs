//! Request-coalescing loader in front of the resource-fetch endpoint.
//!
//! 1. A load whose key is already cached resolves immediately
//! 2. A load whose key is already queued or in flight attaches to that fetch
//! 3. Otherwise the key joins the current batching window
//! 4. When the window closes, each queued key is fetched exactly once
//! 5. Successful payloads are primed before any waiter is woken
//! 6. Failures go to every waiter and leave no cache entry behind
//! 7. A prime made while a key is in flight replaces that fetch's result

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::oneshot;
use tracing::debug;

use crate::cache::{ResourceCache, ResourceKey};
use crate::error::{ApiError, ApiResult};
use crate::resource::{PrimaryData, Resource, ResourceDocument};
use crate::transport::{ApiClient, ApiRequest};

type LoadResult = ApiResult<Arc<Resource>>;

/// Loader tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderConfig {
  /// How long a batch stays open. Zero closes it after one scheduler yield.
  pub batch_window: Duration,
}

/// Counters for observing loader behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
  /// Loads answered from the cache without queueing
  pub cache_hits: u64,
  /// Loads that attached to a fetch already queued or in flight
  pub deduplicated: u64,
  /// Upstream resource-fetch calls issued
  pub fetches: u64,
}

#[derive(Default)]
struct Counters {
  cache_hits: AtomicU64,
  deduplicated: AtomicU64,
  fetches: AtomicU64,
}

#[derive(Default)]
struct Pending {
  /// Keys waiting for the current window to close: (normalized, as requested)
  queue: Vec<(ResourceKey, ResourceKey)>,
  /// Everyone waiting on a queued or in-flight key, by normalized key
  waiters: HashMap<ResourceKey, Vec<oneshot::Sender<LoadResult>>>,
  /// Values primed while their key was queued or in flight
  primed_in_flight: HashMap<ResourceKey, Arc<Resource>>,
  dispatch_scheduled: bool,
}

struct Inner {
  client: ApiClient,
  cache: ResourceCache,
  config: LoaderConfig,
  pending: Mutex<Pending>,
  counters: Counters,
}

/// Batched, deduplicating, cache-backed loader for single resources.
///
/// Must be used from within a tokio runtime; dispatch runs on a spawned task.
/// Clones share the cache and the pending set.
#[derive(Clone)]
pub struct ResourceLoader {
  inner: Arc<Inner>,
}

impl ResourceLoader {
  pub fn new(client: ApiClient, cache: ResourceCache, config: LoaderConfig) -> Self {
    Self {
      inner: Arc::new(Inner {
        client,
        cache,
        config,
        pending: Mutex::new(Pending::default()),
        counters: Counters::default(),
      }),
    }
  }

  pub fn cache(&self) -> &ResourceCache {
    &self.inner.cache
  }

  /// Load one resource, from cache if possible.
  ///
  /// Every caller waiting on the same key receives the same `Arc`.
  pub async fn load(&self, key: ResourceKey) -> LoadResult {
    if let Some(hit) = self.inner.cache.get(&key) {
      self.inner.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
      debug!(%key, "loader cache hit");
      return Ok(hit);
    }

    let receiver = self.enqueue(&key);
    receiver.await.map_err(|_| ApiError::LoaderDropped {
      key: key.to_string(),
    })?
  }

  /// Load several keys in one batching window. Results follow input order.
  pub async fn load_many(&self, keys: Vec<ResourceKey>) -> Vec<LoadResult> {
    join_all(keys.into_iter().map(|key| self.load(key))).await
  }

  /// Insert `resource` under `key` without fetching, replacing any entry.
  ///
  /// If a fetch for `key` is pending, its waiters receive `resource` and the
  /// fetched payload is discarded.
  pub fn prime(&self, key: &ResourceKey, resource: impl Into<Arc<Resource>>) {
    let resource = resource.into();
    let normalized = self.inner.cache.aliases().normalize(key);

    let mut pending = self.inner.lock_pending();
    if pending.waiters.contains_key(&normalized) {
      debug!(%key, "primed while pending");
      pending
        .primed_in_flight
        .insert(normalized.clone(), Arc::clone(&resource));
    }
    self.inner.cache.prime(&normalized, resource);
  }

  pub fn clear(&self, key: &ResourceKey) {
    self.inner.cache.invalidate(key);
  }

  pub fn clear_all(&self) {
    self.inner.cache.clear();
  }

  pub fn stats(&self) -> LoaderStats {
    let counters = &self.inner.counters;
    LoaderStats {
      cache_hits: counters.cache_hits.load(Ordering::Relaxed),
      deduplicated: counters.deduplicated.load(Ordering::Relaxed),
      fetches: counters.fetches.load(Ordering::Relaxed),
    }
  }

  fn enqueue(&self, key: &ResourceKey) -> oneshot::Receiver<LoadResult> {
    let normalized = self.inner.cache.aliases().normalize(key);
    let (sender, receiver) = oneshot::channel();

    let schedule = {
      let mut pending = self.inner.lock_pending();
      if let Some(waiters) = pending.waiters.get_mut(&normalized) {
        waiters.push(sender);
        self
          .inner
          .counters
          .deduplicated
          .fetch_add(1, Ordering::Relaxed);
        debug!(%key, "attached to pending load");
        return receiver;
      }

      pending.waiters.insert(normalized.clone(), vec![sender]);
      pending.queue.push((normalized, key.clone()));
      !std::mem::replace(&mut pending.dispatch_scheduled, true)
    };

    if schedule {
      let inner = Arc::clone(&self.inner);
      tokio::spawn(inner.dispatch());
    }

    receiver
  }
}

impl Inner {
  fn lock_pending(&self) -> MutexGuard<'_, Pending> {
    self.pending.lock().unwrap_or_else(PoisonError::into_inner)
  }

  async fn dispatch(self: Arc<Self>) {
    if self.config.batch_window.is_zero() {
      tokio::task::yield_now().await;
    } else {
      tokio::time::sleep(self.config.batch_window).await;
    }

    let batch = {
      let mut pending = self.lock_pending();
      pending.dispatch_scheduled = false;
      std::mem::take(&mut pending.queue)
    };
    debug!(keys = batch.len(), "dispatching load batch");

    join_all(
      batch
        .into_iter()
        .map(|(normalized, requested)| self.resolve(normalized, requested)),
    )
    .await;
  }

  async fn resolve(&self, normalized: ResourceKey, requested: ResourceKey) {
    // Something may have primed this key while it sat in the queue.
    let fetched = match self.cache.get(&normalized) {
      Some(hit) => Ok(hit),
      None => {
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        self.fetch(&requested).await.map(Arc::new)
      }
    };

    // Settle the cache under the lock so a concurrent prime cannot interleave.
    let (waiters, result) = {
      let mut pending = self.lock_pending();
      let result = match pending.primed_in_flight.remove(&normalized) {
        Some(primed) => {
          self.cache.prime(&normalized, Arc::clone(&primed));
          Ok(primed)
        }
        None => {
          match &fetched {
            Ok(resource) => self.cache.prime(&normalized, Arc::clone(resource)),
            Err(e) => debug!(key = %requested, error = %e, "load failed"),
          }
          fetched
        }
      };
      let waiters = pending.waiters.remove(&normalized).unwrap_or_default();
      (waiters, result)
    };

    for waiter in waiters {
      // A dropped receiver only means the caller stopped waiting.
      let _ = waiter.send(result.clone());
    }
  }

  async fn fetch(&self, key: &ResourceKey) -> ApiResult<Resource> {
    let mut request = ApiRequest::get(format!("/api/v3/{}/{}", key.kind, key.id));
    if let Some(include) = &key.include {
      request = request.query("include", include.clone());
    }

    let body = self.client.send(request).await?;
    let document: ResourceDocument =
      serde_json::from_value(body).map_err(|e| ApiError::decode(format!("resource {}", key), e))?;

    match document.data {
      PrimaryData::One(resource) => Ok(resource),
      PrimaryData::Many(_) => Err(ApiError::decode(
        format!("resource {}", key),
        "expected a single resource, got a list",
      )),
    }
  }
}

//! Cache priming from response bodies.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::cache::ResourceCache;
use crate::resource::ResourceDocument;
use crate::transport::{ApiRequest, ResponseInterceptor};

/// Prime `cache` with every resource in `body` (primary and included).
///
/// Returns how many resources were primed. Bodies that are not resource
/// documents prime nothing.
pub fn absorb_document(cache: &ResourceCache, body: &Value) -> usize {
  if body.get("data").is_none() {
    return 0;
  }

  let document: ResourceDocument = match serde_json::from_value(body.clone()) {
    Ok(document) => document,
    Err(e) => {
      trace!(error = %e, "response is not a resource document");
      return 0;
    }
  };

  let mut primed = 0;
  for resource in document.all_resources() {
    cache.prime_resource(Arc::new(resource.clone()));
    primed += 1;
  }
  primed
}

/// Interceptor that runs [`absorb_document`] over every successful response.
#[derive(Clone)]
pub struct ResponseAbsorber {
  cache: ResourceCache,
}

impl ResponseAbsorber {
  pub fn new(cache: ResourceCache) -> Self {
    Self { cache }
  }
}

impl ResponseInterceptor for ResponseAbsorber {
  fn on_response(&self, request: &ApiRequest, body: &Value) {
    let primed = absorb_document(&self.cache, body);
    if primed > 0 {
      debug!(path = %request.path, primed, "absorbed resources into cache");
    }
  }
}

//! Platform client that routes single-resource reads through the loader.

use std::sync::Arc;

use serde_json::Value;

use super::kinds;
use super::query::ListQuery;
use crate::cache::{CacheConfig, ResourceCache, ResourceKey, TypeAliases};
use crate::error::{ApiError, ApiResult};
use crate::loader::{LoaderConfig, ResourceLoader, ResponseAbsorber};
use crate::resource::{Resource, ResourceCollection};
use crate::storage::StoragePipeline;
use crate::transport::{ApiClient, ApiRequest, Transport};

/// Everything needed to wire a [`PlatformClient`] besides the transport.
#[derive(Debug, Clone)]
pub struct ClientOptions {
  pub aliases: TypeAliases,
  pub cache: CacheConfig,
  pub loader: LoaderConfig,
  /// Default installation scope for storage pipelines
  pub install_id: Option<String>,
}

impl Default for ClientOptions {
  fn default() -> Self {
    Self {
      aliases: TypeAliases::platform_defaults(),
      cache: CacheConfig::unbounded(),
      loader: LoaderConfig::default(),
      install_id: None,
    }
  }
}

/// Platform client with transparent caching of single-resource reads.
///
/// Single resources go through the [`ResourceLoader`]; list endpoints go
/// straight to the transport. Every successful response, including list
/// responses, is absorbed into the shared cache.
#[derive(Clone)]
pub struct PlatformClient {
  api: ApiClient,
  loader: ResourceLoader,
  install_id: Option<String>,
}

impl PlatformClient {
  pub fn new(transport: Arc<dyn Transport>, options: ClientOptions) -> Self {
    let cache = ResourceCache::new(options.aliases, options.cache);
    let api =
      ApiClient::new(transport).with_interceptor(Arc::new(ResponseAbsorber::new(cache.clone())));
    let loader = ResourceLoader::new(api.clone(), cache, options.loader);

    Self {
      api,
      loader,
      install_id: options.install_id,
    }
  }

  /// Raw API access; responses still prime the cache.
  pub fn api(&self) -> &ApiClient {
    &self.api
  }

  pub fn loader(&self) -> &ResourceLoader {
    &self.loader
  }

  /// Load any resource by type and id.
  pub async fn get_resource(
    &self,
    kind: &str,
    id: &str,
    include: Option<&str>,
  ) -> ApiResult<Arc<Resource>> {
    if id.is_empty() {
      return Err(ApiError::InvalidRequest(format!("empty {} id", kind)));
    }
    let mut key = ResourceKey::new(kind, id);
    if let Some(include) = include {
      key = key.with_include(include);
    }
    self.loader.load(key).await
  }

  pub async fn get_employee(&self, id: &str) -> ApiResult<Arc<Resource>> {
    self.get_resource(kinds::EMPLOYEES, id, None).await
  }

  /// Employee with its current flow embedded.
  pub async fn get_employee_with_flow(&self, id: &str) -> ApiResult<Arc<Resource>> {
    self.get_resource(kinds::EMPLOYEES, id, Some("flow")).await
  }

  /// The flow linked from an employee, if the employee has one.
  ///
  /// The flow arrives embedded in the employee response, so resolving it is a
  /// cache hit.
  pub async fn get_employee_flow(&self, employee_id: &str) -> ApiResult<Option<Arc<Resource>>> {
    let employee = self.get_employee_with_flow(employee_id).await?;
    match employee.related_id("flow") {
      Some(flow_id) => self.get_flow(flow_id).await.map(Some),
      None => Ok(None),
    }
  }

  pub async fn get_flow(&self, id: &str) -> ApiResult<Arc<Resource>> {
    self.get_resource(kinds::FLOWS, id, None).await
  }

  pub async fn get_employee_screening_flow(&self, id: &str) -> ApiResult<Arc<Resource>> {
    self
      .get_resource(kinds::EMPLOYEE_SCREENING_FLOWS, id, None)
      .await
  }

  pub async fn get_location(&self, id: &str) -> ApiResult<Arc<Resource>> {
    self.get_resource(kinds::LOCATIONS, id, None).await
  }

  pub async fn get_invite(&self, id: &str) -> ApiResult<Arc<Resource>> {
    self.get_resource(kinds::INVITES, id, None).await
  }

  pub async fn get_user(&self, id: &str) -> ApiResult<Arc<Resource>> {
    self.get_resource(kinds::USERS, id, None).await
  }

  /// Query employees (not cached as a query).
  pub async fn get_employees(&self, query: &ListQuery) -> ApiResult<ResourceCollection> {
    self.list(kinds::EMPLOYEES, query).await
  }

  /// Query invites (not cached as a query).
  pub async fn get_invites(&self, query: &ListQuery) -> ApiResult<ResourceCollection> {
    self.list(kinds::INVITES, query).await
  }

  pub async fn list(&self, kind: &str, query: &ListQuery) -> ApiResult<ResourceCollection> {
    let request = query
      .to_params()
      .into_iter()
      .fold(ApiRequest::get(format!("/api/v3/{}", kind)), |req, (k, v)| {
        req.query(k, v)
      });

    let body: Value = self.api.send(request).await?;
    serde_json::from_value(body).map_err(|e| ApiError::decode(format!("{} list", kind), e))
  }

  /// Empty storage pipeline scoped to the configured installation, if any.
  pub fn storage(&self) -> StoragePipeline {
    let pipeline = StoragePipeline::new(self.api.clone());
    match &self.install_id {
      Some(install_id) => pipeline.for_install(install_id.clone()),
      None => pipeline,
    }
  }

  /// Empty storage pipeline scoped to `install_id`.
  pub fn storage_for(&self, install_id: impl Into<String>) -> StoragePipeline {
    StoragePipeline::new(self.api.clone()).for_install(install_id)
  }
}

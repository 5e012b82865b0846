use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use super::{ApiRequest, Transport};
use crate::error::ApiResult;

/// Observer invoked with every successful response body.
///
/// Runs synchronously before the caller of [`ApiClient::send`] sees the
/// result, so side effects (cache priming) are visible to anything the caller
/// does next. Implementations must not fail the request.
pub trait ResponseInterceptor: Send + Sync {
  fn on_response(&self, request: &ApiRequest, body: &Value);
}

/// Transport plus the interceptors attached to it.
///
/// Cheap to clone; clones share the transport and interceptor list.
#[derive(Clone)]
pub struct ApiClient {
  transport: Arc<dyn Transport>,
  interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClient {
  pub fn new(transport: Arc<dyn Transport>) -> Self {
    Self {
      transport,
      interceptors: Vec::new(),
    }
  }

  pub fn with_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
    self.interceptors.push(interceptor);
    self
  }

  /// Send a request; on success, run every interceptor over the body.
  ///
  /// Transport errors are returned untouched.
  pub async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
    let body = self.transport.send(&request).await?;
    for interceptor in &self.interceptors {
      interceptor.on_response(&request, &body);
    }
    Ok(body)
  }

  pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<Value> {
    let request = query
      .iter()
      .fold(ApiRequest::get(path), |req, (k, v)| req.query(*k, *v));
    self.send(request).await
  }

  pub async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
    self.send(ApiRequest::post(path, body)).await
  }

  pub async fn put(&self, path: &str, body: Value) -> ApiResult<Value> {
    self.send(ApiRequest::new(Method::PUT, path).json(body)).await
  }

  pub async fn patch(&self, path: &str, body: Value) -> ApiResult<Value> {
    self
      .send(ApiRequest::new(Method::PATCH, path).json(body))
      .await
  }

  pub async fn delete(&self, path: &str) -> ApiResult<Value> {
    self.send(ApiRequest::new(Method::DELETE, path)).await
  }
}

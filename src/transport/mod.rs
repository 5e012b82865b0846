//! HTTP capability used by the loader and the storage pipeline.
//!
//! `Transport` is the seam: production code uses [`HttpTransport`], tests
//! plug in an in-memory implementation. [`ApiClient`] layers response
//! interceptors on top of whatever transport it is given.

mod client;
mod http;

pub use client::{ApiClient, ResponseInterceptor};
pub use http::HttpTransport;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::ApiResult;

/// A single API call, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  pub path: String,
  pub query: Vec<(String, String)>,
  pub body: Option<Value>,
}

impl ApiRequest {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      query: Vec::new(),
      body: None,
    }
  }

  pub fn get(path: impl Into<String>) -> Self {
    Self::new(Method::GET, path)
  }

  pub fn post(path: impl Into<String>, body: Value) -> Self {
    Self::new(Method::POST, path).json(body)
  }

  pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.query.push((name.into(), value.into()));
    self
  }

  pub fn json(mut self, body: Value) -> Self {
    self.body = Some(body);
    self
  }

  /// Value of the first query parameter named `name`.
  pub fn query_value(&self, name: &str) -> Option<&str> {
    self
      .query
      .iter()
      .find(|(k, _)| k == name)
      .map(|(_, v)| v.as_str())
  }
}

/// Something that can execute an [`ApiRequest`] and hand back the JSON body.
///
/// Implementations own authorization and timeouts. A non-success status must
/// come back as `Err`, never as an `Ok` body.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: &ApiRequest) -> ApiResult<Value>;
}

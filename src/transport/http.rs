use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use super::{ApiRequest, Transport};
use crate::error::{ApiError, ApiResult};

/// reqwest-backed transport with a per-instance bearer token.
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
  base_url: Url,
  token: String,
}

impl HttpTransport {
  pub fn new(base_url: &str, token: impl Into<String>) -> ApiResult<Self> {
    let base_url = Url::parse(base_url)
      .map_err(|e| ApiError::InvalidRequest(format!("bad base url {}: {}", base_url, e)))?;

    let client = reqwest::Client::builder()
      .user_agent(concat!("waypost/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| ApiError::Network {
        url: base_url.to_string(),
        message: e.to_string(),
      })?;

    Ok(Self {
      client,
      base_url,
      token: token.into(),
    })
  }

  /// Join `path` onto the base URL, keeping any path prefix the base carries.
  fn url_for(&self, request: &ApiRequest) -> ApiResult<Url> {
    let joined = format!(
      "{}/{}",
      self.base_url.as_str().trim_end_matches('/'),
      request.path.trim_start_matches('/')
    );
    let mut url =
      Url::parse(&joined).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", joined, e)))?;

    if !request.query.is_empty() {
      url.query_pairs_mut().extend_pairs(request.query.iter());
    }

    Ok(url)
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: &ApiRequest) -> ApiResult<Value> {
    let url = self.url_for(request)?;
    debug!(method = %request.method, %url, "sending request");

    let mut builder = self
      .client
      .request(request.method.clone(), url.clone())
      .bearer_auth(&self.token);
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await.map_err(|e| ApiError::Network {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| ApiError::Network {
      url: url.to_string(),
      message: e.to_string(),
    })?;
    trace!(%status, bytes = text.len(), "received response");

    if !status.is_success() {
      return Err(ApiError::Status {
        method: request.method.to_string(),
        url: url.to_string(),
        status: status.as_u16(),
        body: text,
      });
    }

    // 204s and empty DELETE responses
    if text.trim().is_empty() {
      return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| ApiError::decode(format!("response from {}", url), e))
  }
}

//! Shared test doubles: a scripted transport and an in-memory storage service.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use waypost::storage::{StorageCommand, STORAGE_PATH};
use waypost::transport::{ApiRequest, Transport};
use waypost::{ApiError, ApiResult};

type Handler = Box<dyn Fn(&ApiRequest) -> ApiResult<Value> + Send + Sync>;

/// Transport that answers from scripted replies and records every request.
///
/// Replies are queued per `METHOD path`; the last queued reply for a route
/// keeps answering once the queue is down to one. Unscripted routes get 404.
pub struct MockTransport {
  replies: Mutex<HashMap<String, VecDeque<ApiResult<Value>>>>,
  handler: Option<Handler>,
  requests: Mutex<Vec<ApiRequest>>,
  delay: Option<Duration>,
}

fn route(method: &Method, path: &str) -> String {
  format!("{} {}", method, path)
}

pub fn status_error(method: &Method, path: &str, status: u16) -> ApiError {
  ApiError::Status {
    method: method.to_string(),
    url: format!("https://platform.test{}", path),
    status,
    body: json!({ "error": "scripted" }).to_string(),
  }
}

impl MockTransport {
  pub fn new() -> Self {
    Self {
      replies: Mutex::new(HashMap::new()),
      handler: None,
      requests: Mutex::new(Vec::new()),
      delay: None,
    }
  }

  /// Answer every request with `handler`.
  pub fn with_handler(
    handler: impl Fn(&ApiRequest) -> ApiResult<Value> + Send + Sync + 'static,
  ) -> Self {
    Self {
      handler: Some(Box::new(handler)),
      ..Self::new()
    }
  }

  /// Hold every response for `delay` so requests stay in flight.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn respond(&self, method: Method, path: &str, body: Value) -> &Self {
    self.push(method, path, Ok(body))
  }

  pub fn fail(&self, method: Method, path: &str, status: u16) -> &Self {
    let error = status_error(&method, path, status);
    self.push(method, path, Err(error))
  }

  fn push(&self, method: Method, path: &str, reply: ApiResult<Value>) -> &Self {
    self
      .replies
      .lock()
      .unwrap()
      .entry(route(&method, path))
      .or_default()
      .push_back(reply);
    self
  }

  pub fn requests(&self) -> Vec<ApiRequest> {
    self.requests.lock().unwrap().clone()
  }

  pub fn count(&self, method: Method, path: &str) -> usize {
    self
      .requests
      .lock()
      .unwrap()
      .iter()
      .filter(|r| r.method == method && r.path == path)
      .count()
  }

  pub fn total(&self) -> usize {
    self.requests.lock().unwrap().len()
  }

  fn reply_for(&self, request: &ApiRequest) -> ApiResult<Value> {
    if let Some(handler) = &self.handler {
      return handler(request);
    }

    let mut replies = self.replies.lock().unwrap();
    match replies.get_mut(&route(&request.method, &request.path)) {
      Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
      Some(queue) if !queue.is_empty() => queue[0].clone(),
      _ => Err(status_error(&request.method, &request.path, 404)),
    }
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn send(&self, request: &ApiRequest) -> ApiResult<Value> {
    self.requests.lock().unwrap().push(request.clone());
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    self.reply_for(request)
  }
}

/// Resource document helpers.
pub fn resource(kind: &str, id: &str) -> Value {
  json!({ "type": kind, "id": id, "attributes": { "label": format!("{} {}", kind, id) } })
}

pub fn document(kind: &str, id: &str, included: Vec<Value>) -> Value {
  json!({ "data": resource(kind, id), "included": included })
}

pub fn resource_path(kind: &str, id: &str) -> String {
  format!("/api/v3/{}/{}", kind, id)
}

/// Minimal in-memory stand-in for the plugin storage service.
///
/// Applies commands in order and answers `null` for misses and failed
/// uniqueness checks, like the real service.
#[derive(Default)]
pub struct StorageServer {
  values: Mutex<HashMap<(Option<String>, String), Value>>,
}

impl StorageServer {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn transport(self: &Arc<Self>) -> MockTransport {
    let server = Arc::clone(self);
    MockTransport::with_handler(move |request| server.handle(request))
  }

  pub fn value(&self, install_id: Option<&str>, key: &str) -> Option<Value> {
    self
      .values
      .lock()
      .unwrap()
      .get(&(install_id.map(String::from), key.to_string()))
      .cloned()
  }

  fn handle(&self, request: &ApiRequest) -> ApiResult<Value> {
    if request.method != Method::POST || request.path != STORAGE_PATH {
      return Err(status_error(&request.method, &request.path, 404));
    }
    let body = request.body.clone().unwrap_or(Value::Null);
    let install_id = body
      .get("install_id")
      .and_then(Value::as_str)
      .map(String::from);
    let commands: Vec<StorageCommand> =
      serde_json::from_value(body.get("commands").cloned().unwrap_or(Value::Null))
        .map_err(|_| status_error(&request.method, &request.path, 400))?;

    let mut values = self.values.lock().unwrap();
    let results: Vec<Value> = commands
      .into_iter()
      .map(|command| {
        let slot = (install_id.clone(), command.key().to_string());
        let item = |value: &Value| json!({ "key": command.key(), "value": value });
        match &command {
          StorageCommand::Get { .. } => values.get(&slot).map(item).unwrap_or(Value::Null),
          StorageCommand::Set { value, .. } => {
            values.insert(slot, value.clone());
            item(value)
          }
          StorageCommand::SetUnique { value, .. } => {
            if values.contains_key(&slot) {
              Value::Null
            } else {
              let value = value.clone().unwrap_or(Value::Bool(true));
              values.insert(slot, value.clone());
              item(&value)
            }
          }
          StorageCommand::SetUniqueNum {
            start, increment, ..
          } => {
            let next = match values.get(&slot).and_then(Value::as_i64) {
              Some(current) => current + increment.unwrap_or(1),
              None => start.unwrap_or(1),
            };
            values.insert(slot, json!(next));
            item(&json!(next))
          }
          StorageCommand::Unset { .. } => values
            .remove(&slot)
            .map(|old| item(&old))
            .unwrap_or(Value::Null),
        }
      })
      .collect();

    Ok(json!({ "data": results }))
  }
}

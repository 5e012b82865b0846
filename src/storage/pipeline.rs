use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::command::{StorageCommand, StorageItem};
use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiClient, ApiRequest};

/// Endpoint that accepts a whole pipeline in one request.
pub const STORAGE_PATH: &str = "/api/v2/plugin-services/storage";

#[derive(Debug, Serialize)]
struct StorageRequest<'a> {
  commands: &'a [StorageCommand],
  #[serde(skip_serializing_if = "Option::is_none")]
  install_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct StorageResponse {
  data: Vec<Option<StorageItem>>,
}

/// Ordered batch of storage commands bound to one namespace.
///
/// Built by appending, then sent with [`execute`](Self::execute). Executing
/// again re-sends the same commands; `set_unique*` commands are not
/// idempotent, so a replay can come back `None` or claim another number.
#[derive(Clone)]
pub struct StoragePipeline {
  client: ApiClient,
  install_id: Option<String>,
  commands: Vec<StorageCommand>,
}

impl StoragePipeline {
  pub fn new(client: ApiClient) -> Self {
    Self {
      client,
      install_id: None,
      commands: Vec::new(),
    }
  }

  /// Scope the pipeline to one installation.
  pub fn for_install(mut self, install_id: impl Into<String>) -> Self {
    self.install_id = Some(install_id.into());
    self
  }

  pub fn add_command(mut self, command: StorageCommand) -> Self {
    self.commands.push(command);
    self
  }

  pub fn get(self, key: impl Into<String>) -> Self {
    self.add_command(StorageCommand::Get { key: key.into() })
  }

  pub fn set(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.add_command(StorageCommand::Set {
      key: key.into(),
      value: value.into(),
    })
  }

  pub fn set_unique(
    self,
    key: impl Into<String>,
    value: Option<Value>,
    if_not_exists: Option<bool>,
  ) -> Self {
    self.add_command(StorageCommand::SetUnique {
      key: key.into(),
      value,
      if_not_exists,
    })
  }

  pub fn set_unique_num(
    self,
    key: impl Into<String>,
    start: Option<i64>,
    increment: Option<i64>,
  ) -> Self {
    self.add_command(StorageCommand::SetUniqueNum {
      key: key.into(),
      start,
      increment,
    })
  }

  pub fn unset(self, key: impl Into<String>) -> Self {
    self.add_command(StorageCommand::Unset { key: key.into() })
  }

  pub fn commands(&self) -> &[StorageCommand] {
    &self.commands
  }

  pub fn install_id(&self) -> Option<&str> {
    self.install_id.as_deref()
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }

  /// Send every command in one request.
  ///
  /// The result has one slot per command, in command order. Any transport
  /// failure fails the whole call; no partial result is produced.
  pub async fn execute(&self) -> ApiResult<Vec<Option<StorageItem>>> {
    if self.commands.is_empty() {
      return Err(ApiError::InvalidRequest(
        "storage pipeline has no commands".to_string(),
      ));
    }

    let body = serde_json::to_value(StorageRequest {
      commands: &self.commands,
      install_id: self.install_id.as_deref(),
    })
    .map_err(|e| ApiError::InvalidRequest(format!("unserializable storage command: {}", e)))?;

    debug!(
      commands = self.commands.len(),
      install_id = ?self.install_id,
      "executing storage pipeline"
    );
    let body = self.client.send(ApiRequest::post(STORAGE_PATH, body)).await?;

    let response: StorageResponse =
      serde_json::from_value(body).map_err(|e| ApiError::decode("storage response", e))?;

    if response.data.len() != self.commands.len() {
      warn!(
        expected = self.commands.len(),
        got = response.data.len(),
        "storage result count mismatch"
      );
      return Err(ApiError::decode(
        "storage response",
        format!(
          "expected {} results, got {}",
          self.commands.len(),
          response.data.len()
        ),
      ));
    }

    Ok(response.data)
  }

  /// Send, then return only the first result.
  pub async fn execute_single(&self) -> ApiResult<Option<StorageItem>> {
    if self.commands.len() > 1 {
      debug!(
        commands = self.commands.len(),
        "execute_single discarding trailing results"
      );
    }
    Ok(self.execute().await?.into_iter().next().flatten())
  }
}

//! Error type shared by the transport, loader and storage pipeline.

use thiserror::Error;

/// Errors surfaced by the platform client.
///
/// `Clone` so a single upstream failure can be handed to every caller that
/// was waiting on the same deduplicated load.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
  /// The request never produced a response (DNS, TLS, connection reset, timeout).
  #[error("request to {url} failed: {message}")]
  Network { url: String, message: String },

  /// The server answered with a non-success status.
  #[error("{method} {url} returned {status}: {body}")]
  Status {
    method: String,
    url: String,
    status: u16,
    body: String,
  },

  /// The response body did not have the expected shape.
  #[error("failed to decode {context}: {message}")]
  Decode { context: String, message: String },

  /// The request was rejected before being sent.
  #[error("invalid request: {0}")]
  InvalidRequest(String),

  /// The loader's dispatch task went away before answering.
  #[error("loader dispatch dropped before {key} resolved")]
  LoaderDropped { key: String },
}

impl ApiError {
  pub(crate) fn decode(context: impl Into<String>, message: impl ToString) -> Self {
    Self::Decode {
      context: context.into(),
      message: message.to_string(),
    }
  }

  /// HTTP status code, if the server answered at all.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_not_found(&self) -> bool {
    self.status() == Some(404)
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

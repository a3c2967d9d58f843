//! Error taxonomy for refresh operations.

use serde::Serialize;
use thiserror::Error;

/// Why a refresh could not produce a live value.
///
/// Only `Validation` is ever returned to the caller directly. Every other
/// variant is absorbed into a fallback value and reported as a
/// [`SyncNotice`](crate::sync::SyncNotice).
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncError {
  /// Location access refused by the device
  #[error("location permission denied")]
  PermissionDenied,

  /// The bounded fetch deadline fired first
  #[error("request timed out after {after_ms} ms")]
  Timeout { after_ms: u64 },

  /// Transport-level failure (connect, DNS, unconfigured endpoint)
  #[error("network error: {message}")]
  Network { message: String },

  /// Non-2xx status or a payload that does not match the expected shape
  #[error("server error: {message}")]
  Server { message: String },

  /// Caller-supplied parameter rejected before any network call
  #[error("invalid {field}: {message}")]
  Validation {
    field: &'static str,
    message: String,
  },
}

impl SyncError {
  pub fn network(message: impl Into<String>) -> Self {
    Self::Network {
      message: message.into(),
    }
  }

  pub fn server(message: impl Into<String>) -> Self {
    Self::Server {
      message: message.into(),
    }
  }

  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation {
      field,
      message: message.into(),
    }
  }

  /// Whether retrying the same call later could succeed.
  pub fn is_recoverable(&self) -> bool {
    !matches!(self, Self::Validation { .. })
  }
}

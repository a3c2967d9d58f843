//! Deadline-bounded network calls.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::SyncError;

/// Budget applied to every refresh unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Race `operation` against a `timeout` deadline.
///
/// Whichever settles first decides the outcome. When the deadline wins the
/// operation future is dropped, so a response arriving later is discarded
/// and can never write to the store.
pub async fn bounded<T, F, Fut>(timeout: Duration, operation: F) -> Result<T, SyncError>
where
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<T, SyncError>>,
{
  match tokio::time::timeout(timeout, operation()).await {
    Ok(result) => result,
    Err(_) => {
      debug!(timeout_ms = timeout.as_millis() as u64, "bounded fetch deadline fired");
      Err(SyncError::Timeout {
        after_ms: timeout.as_millis() as u64,
      })
    }
  }
}

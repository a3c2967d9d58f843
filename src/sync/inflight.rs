//! At most one refresh per domain.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

struct Settled<T> {
  seq: u64,
  key: String,
  outcome: T,
}

/// Serializes refreshes of one domain and lets late arrivals join.
///
/// A caller that arrives while a refresh with the same key is running waits
/// for it and receives a clone of its outcome instead of starting its own.
/// A caller with a different key waits and then runs its own refresh.
pub struct InFlight<T> {
  completed: AtomicU64,
  slot: Mutex<Option<Settled<T>>>,
}

impl<T> Default for InFlight<T> {
  fn default() -> Self {
    Self {
      completed: AtomicU64::new(0),
      slot: Mutex::new(None),
    }
  }
}

impl<T: Clone> InFlight<T> {
  pub async fn run<F, Fut>(&self, key: &str, refresh: F) -> T
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
  {
    let arrived_after = self.completed.load(Ordering::Acquire);
    let mut slot = self.slot.lock().await;

    if let Some(settled) = slot.as_ref() {
      if settled.seq > arrived_after && settled.key == key {
        debug!(key, "joined in-flight refresh");
        return settled.outcome.clone();
      }
    }

    let outcome = refresh().await;
    let seq = self.completed.load(Ordering::Acquire) + 1;
    *slot = Some(Settled {
      seq,
      key: key.to_string(),
      outcome: outcome.clone(),
    });
    self.completed.store(seq, Ordering::Release);

    outcome
  }
}

//! Synchronization facade between the dashboard and its data sources.
//!
//! Reads always come from the store. Refreshes go through a resolver and a
//! bounded fetch, and every outcome (live or fallback) is written back so the
//! next read shows the latest known state.

mod facade;
mod inflight;

use serde::Serialize;

use crate::error::SyncError;
use crate::model::{CropSelection, Domain, Location, SoilReading, WeatherReading};

pub use facade::FieldSync;

/// Outcome of one refresh call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Refreshed<T> {
  pub value: T,
  /// Why the live path failed, when the value is a fallback
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<SyncError>,
}

impl<T> Refreshed<T> {
  pub fn live(value: T) -> Self {
    Self { value, error: None }
  }

  pub fn fallback(value: T, error: SyncError) -> Self {
    Self {
      value,
      error: Some(error),
    }
  }

  /// Whether the UI should offer a retry.
  pub fn used_fallback(&self) -> bool {
    self.error.is_some()
  }

  fn notice(&self, domain: Domain) -> Option<SyncNotice> {
    self.error.clone().map(|error| SyncNotice { domain, error })
  }
}

/// Recoverable error raised alongside a fallback value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncNotice {
  pub domain: Domain,
  pub error: SyncError,
}

/// The four values on the dashboard's main block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
  pub location: Option<Location>,
  pub soil: Option<SoilReading>,
  pub weather: Option<WeatherReading>,
  pub crop: CropSelection,
  /// Refreshes in this batch that fell back
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub notices: Vec<SyncNotice>,
}

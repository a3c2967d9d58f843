//! Per-domain fetch, normalization and fallback logic.
//!
//! Every resolver has the same shape: `fetch_fresh` talks to a collaborator
//! and maps the response into a normalized domain value, and
//! `synthesize_fallback` is the single place that domain's offline value is
//! produced. Resolvers never touch the store or the clock deadline; the
//! facade owns both.

mod location;
mod recommendation;
mod soil;
mod weather;
mod yield_prediction;

use std::fmt::Debug;
use std::future::Future;

use crate::error::SyncError;
use crate::model::Domain;
use crate::store::Persisted;

pub use location::LocationResolver;
pub use recommendation::RecommendationResolver;
pub use soil::SoilResolver;
pub use weather::WeatherResolver;
pub use yield_prediction::{YieldRequest, YieldResolver};

pub trait Resolver: Send + Sync {
  type Params: Debug + Send + Sync;
  type Value: Persisted + Clone + Send + Sync;

  const DOMAIN: Domain;

  /// Fetch and normalize a live value.
  fn fetch_fresh(
    &self,
    params: &Self::Params,
  ) -> impl Future<Output = Result<Self::Value, SyncError>> + Send;

  /// Build the offline value after `reason` stopped the live path.
  ///
  /// `cached` is whatever the store held before the refresh. `None` means
  /// the domain keeps showing its "unknown" sentinel.
  fn synthesize_fallback(
    &self,
    params: &Self::Params,
    cached: Option<Self::Value>,
    reason: &SyncError,
  ) -> Option<Self::Value>;
}

fn finite(field: &str, value: f64) -> Result<f64, SyncError> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(SyncError::server(format!("{} is not a finite number", field)))
  }
}

/// Clamp to a whole 0..=100 percentage.
fn percent(field: &str, value: f64) -> Result<u8, SyncError> {
  Ok(finite(field, value)?.round().clamp(0.0, 100.0) as u8)
}

fn one_decimal(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

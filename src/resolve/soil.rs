use chrono::Utc;
use std::sync::Arc;

use super::{finite, percent, Resolver};
use crate::api::api_types::ApiSoilResponse;
use crate::api::FieldApi;
use crate::error::SyncError;
use crate::model::{Coordinates, Domain, Nutrients, Provenance, SoilReading};

/// Soil reading from the soil service or a field IoT gateway.
pub struct SoilResolver<A> {
  api: Arc<A>,
}

impl<A: FieldApi> SoilResolver<A> {
  pub fn new(api: Arc<A>) -> Self {
    Self { api }
  }
}

fn normalize(response: ApiSoilResponse) -> Result<SoilReading, SyncError> {
  let soil_type = response
    .soil_type
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty());

  Ok(SoilReading {
    soil_type,
    moisture_pct: percent("moisture", response.moisture)?,
    nutrients: Nutrients {
      nitrogen: finite("nitrogen", response.nitrogen)?,
      phosphorus: finite("phosphorus", response.phosphorus)?,
      potassium: finite("potassium", response.potassium)?,
    },
    ph: response.ph.map(|ph| finite("ph", ph)).transpose()?,
    provenance: if response.sensor {
      Provenance::Sensor
    } else {
      Provenance::Network
    },
    last_updated: Utc::now(),
  })
}

impl<A: FieldApi> Resolver for SoilResolver<A> {
  type Params = Option<Coordinates>;
  type Value = SoilReading;

  const DOMAIN: Domain = Domain::Soil;

  async fn fetch_fresh(&self, at: &Option<Coordinates>) -> Result<SoilReading, SyncError> {
    let response = self.api.soil_reading(*at).await?;
    normalize(response)
  }

  fn synthesize_fallback(
    &self,
    _at: &Option<Coordinates>,
    cached: Option<SoilReading>,
    reason: &SyncError,
  ) -> Option<SoilReading> {
    cached.map(|reading| SoilReading {
      provenance: Provenance::fallback(reason),
      ..reading
    })
  }
}

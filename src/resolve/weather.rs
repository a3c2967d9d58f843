use chrono::Utc;
use std::sync::Arc;

use super::{finite, one_decimal, percent, Resolver};
use crate::api::api_types::ApiWeatherResponse;
use crate::api::FieldApi;
use crate::error::SyncError;
use crate::model::{Coordinates, Domain, Provenance, WeatherCondition, WeatherReading};

pub struct WeatherResolver<A> {
  api: Arc<A>,
}

impl<A: FieldApi> WeatherResolver<A> {
  pub fn new(api: Arc<A>) -> Self {
    Self { api }
  }
}

/// Map a raw weather response into dashboard units.
fn normalize(response: ApiWeatherResponse) -> Result<WeatherReading, SyncError> {
  let current = response.current;
  let cloud_cover_pct = percent("cloud_cover", current.cloud_cover)?;
  let precipitation_mm = finite("precipitation", current.precipitation)?.max(0.0);

  Ok(WeatherReading {
    temperature_c: one_decimal(finite("temperature_2m", current.temperature_2m)?),
    humidity_pct: percent("relative_humidity_2m", current.relative_humidity_2m)?,
    condition: WeatherCondition::derive(precipitation_mm, cloud_cover_pct),
    wind_speed_kmh: one_decimal(finite("wind_speed_10m", current.wind_speed_10m)?),
    cloud_cover_pct,
    precipitation_mm,
    timezone: response.timezone,
    elevation_m: finite("elevation", response.elevation)?,
    provenance: Provenance::Network,
    last_updated: Utc::now(),
  })
}

impl<A: FieldApi> Resolver for WeatherResolver<A> {
  type Params = Coordinates;
  type Value = WeatherReading;

  const DOMAIN: Domain = Domain::Weather;

  async fn fetch_fresh(&self, at: &Coordinates) -> Result<WeatherReading, SyncError> {
    let response = self.api.current_weather(*at).await?;
    normalize(response)
  }

  /// The last reading, marked as degraded. Its measurement time is kept.
  fn synthesize_fallback(
    &self,
    _at: &Coordinates,
    cached: Option<WeatherReading>,
    reason: &SyncError,
  ) -> Option<WeatherReading> {
    cached.map(|reading| WeatherReading {
      provenance: Provenance::fallback(reason),
      ..reading
    })
  }
}

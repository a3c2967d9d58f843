//! Scripted collaborators shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::api::api_types::{
  ApiCurrentWeather, ApiRecommendationResponse, ApiSoilResponse, ApiWeatherResponse,
  ApiYieldFigures, ApiYieldResponse, RecommendationQuery, YieldQuery,
};
use crate::api::FieldApi;
use crate::device::{Address, LocationProvider, Permission};
use crate::error::SyncError;
use crate::model::{
  Coordinates, Location, Nutrients, Provenance, SoilReading, WeatherCondition, WeatherReading,
};
use chrono::{TimeZone, Utc};

/// What a scripted call answers with.
#[derive(Debug, Clone)]
pub enum Reply<T> {
  Ok(T),
  Fail(SyncError),
  /// Never settles
  Hang,
}

impl<T> Reply<T> {
  async fn resolve(self, latency: Duration) -> Result<T, SyncError> {
    if !latency.is_zero() {
      tokio::time::sleep(latency).await;
    }
    match self {
      Reply::Ok(value) => Ok(value),
      Reply::Fail(e) => Err(e),
      Reply::Hang => std::future::pending().await,
    }
  }
}

/// Ordered record of collaborator calls with the (paused) clock time.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<(String, Instant)>>>);

impl CallLog {
  pub fn record(&self, call: &str) {
    self.0.lock().unwrap().push((call.to_string(), Instant::now()));
  }

  pub fn count(&self, call: &str) -> usize {
    self.0.lock().unwrap().iter().filter(|(c, _)| c == call).count()
  }

  /// Index and time of the first `call`.
  pub fn first(&self, call: &str) -> Option<(usize, Instant)> {
    self
      .0
      .lock()
      .unwrap()
      .iter()
      .enumerate()
      .find(|(_, (c, _))| c == call)
      .map(|(i, (_, at))| (i, *at))
  }

  /// Index and time of the last call whose name starts with `prefix`.
  pub fn last_with_prefix(&self, prefix: &str) -> Option<(usize, Instant)> {
    self
      .0
      .lock()
      .unwrap()
      .iter()
      .enumerate()
      .filter(|(_, (c, _))| c.starts_with(prefix))
      .last()
      .map(|(i, (_, at))| (i, *at))
  }
}

pub struct MockApi {
  pub weather: Mutex<Reply<ApiWeatherResponse>>,
  pub soil: Mutex<Reply<ApiSoilResponse>>,
  pub yields: Mutex<Reply<ApiYieldResponse>>,
  pub recommendation: Mutex<Reply<ApiRecommendationResponse>>,
  pub yield_queries: Mutex<Vec<YieldQuery>>,
  pub recommendation_queries: Mutex<Vec<RecommendationQuery>>,
  pub latency: Duration,
  pub log: CallLog,
}

impl MockApi {
  pub fn new(log: CallLog) -> Self {
    Self {
      weather: Mutex::new(Reply::Ok(weather_response(0.0, 20.0))),
      soil: Mutex::new(Reply::Ok(soil_response(true))),
      yields: Mutex::new(Reply::Ok(yield_response())),
      recommendation: Mutex::new(Reply::Ok(recommendation_response())),
      yield_queries: Mutex::new(Vec::new()),
      recommendation_queries: Mutex::new(Vec::new()),
      latency: Duration::ZERO,
      log,
    }
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  pub fn set_weather(&self, reply: Reply<ApiWeatherResponse>) {
    *self.weather.lock().unwrap() = reply;
  }

  pub fn set_soil(&self, reply: Reply<ApiSoilResponse>) {
    *self.soil.lock().unwrap() = reply;
  }

  pub fn set_yields(&self, reply: Reply<ApiYieldResponse>) {
    *self.yields.lock().unwrap() = reply;
  }

  pub fn set_recommendation(&self, reply: Reply<ApiRecommendationResponse>) {
    *self.recommendation.lock().unwrap() = reply;
  }
}

impl FieldApi for MockApi {
  async fn current_weather(&self, _at: Coordinates) -> Result<ApiWeatherResponse, SyncError> {
    self.log.record("weather");
    let reply = self.weather.lock().unwrap().clone();
    reply.resolve(self.latency).await
  }

  async fn soil_reading(&self, _at: Option<Coordinates>) -> Result<ApiSoilResponse, SyncError> {
    self.log.record("soil");
    let reply = self.soil.lock().unwrap().clone();
    reply.resolve(self.latency).await
  }

  async fn yield_prediction(&self, query: &YieldQuery) -> Result<ApiYieldResponse, SyncError> {
    self.log.record("yield");
    self.yield_queries.lock().unwrap().push(query.clone());
    let reply = self.yields.lock().unwrap().clone();
    reply.resolve(self.latency).await
  }

  async fn crop_recommendation(
    &self,
    query: &RecommendationQuery,
  ) -> Result<ApiRecommendationResponse, SyncError> {
    self.log.record("recommendation");
    self.recommendation_queries.lock().unwrap().push(query.clone());
    let reply = self.recommendation.lock().unwrap().clone();
    reply.resolve(self.latency).await
  }
}

pub struct MockDevice {
  pub permission: Permission,
  pub coordinates: Reply<Coordinates>,
  pub address: Reply<Address>,
  pub latency: Duration,
  pub log: CallLog,
}

impl MockDevice {
  pub fn new(log: CallLog) -> Self {
    Self {
      permission: Permission::Granted,
      coordinates: Reply::Ok(nashik().coordinates()),
      address: Reply::Ok(Address {
        city: Some("Nashik".to_string()),
        region: Some("Maharashtra".to_string()),
        ..Default::default()
      }),
      latency: Duration::ZERO,
      log,
    }
  }

  pub fn denied(log: CallLog) -> Self {
    Self {
      permission: Permission::Denied,
      ..Self::new(log)
    }
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }
}

impl LocationProvider for MockDevice {
  async fn request_permission(&self) -> Permission {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
    self.log.record("location:permission");
    self.permission
  }

  async fn current_coordinates(&self) -> Result<Coordinates, SyncError> {
    let result = self.coordinates.clone().resolve(self.latency).await;
    self.log.record("location:coordinates");
    result
  }

  async fn reverse_geocode(&self, _at: Coordinates) -> Result<Address, SyncError> {
    let result = self.address.clone().resolve(self.latency).await;
    self.log.record("location:geocode");
    result
  }
}

pub fn nashik() -> Location {
  Location {
    display_name: "Nashik, Maharashtra".to_string(),
    latitude: 19.9975,
    longitude: 73.7898,
    provenance: Provenance::Device,
  }
}

pub fn pune() -> Location {
  Location {
    display_name: "Pune, Maharashtra".to_string(),
    latitude: 18.5204,
    longitude: 73.8567,
    provenance: Provenance::Device,
  }
}

pub fn weather_response(precipitation: f64, cloud_cover: f64) -> ApiWeatherResponse {
  ApiWeatherResponse {
    timezone: "Asia/Kolkata".to_string(),
    elevation: 584.0,
    current: ApiCurrentWeather {
      temperature_2m: 27.36,
      relative_humidity_2m: 61.0,
      wind_speed_10m: 9.4,
      cloud_cover,
      precipitation,
    },
  }
}

pub fn soil_response(sensor: bool) -> ApiSoilResponse {
  ApiSoilResponse {
    soil_type: Some("Black cotton".to_string()),
    moisture: 34.2,
    nitrogen: 45.0,
    phosphorus: 32.0,
    potassium: 28.0,
    ph: Some(6.8),
    sensor,
  }
}

pub fn yield_response() -> ApiYieldResponse {
  ApiYieldResponse {
    per_hectare: ApiYieldFigures {
      fertilizer: [110.0, 140.0],
      pesticide: [1.2, 1.8],
      crop_yield: [4.0, 5.5],
    },
    total: ApiYieldFigures {
      fertilizer: [275.0, 350.0],
      pesticide: [3.0, 4.5],
      crop_yield: [10.0, 13.75],
    },
  }
}

pub fn recommendation_response() -> ApiRecommendationResponse {
  ApiRecommendationResponse {
    crop: "soybean".to_string(),
    message: "Moderate moisture and balanced nutrients suit soybean".to_string(),
    nitrogen: Some(45.0),
    phosphorus: Some(32.0),
    potassium: Some(28.0),
  }
}

/// A reading as a previous successful refresh would have stored it.
pub fn cached_weather() -> WeatherReading {
  WeatherReading {
    temperature_c: 24.1,
    humidity_pct: 70,
    condition: WeatherCondition::Cloudy,
    wind_speed_kmh: 6.0,
    cloud_cover_pct: 82,
    precipitation_mm: 0.0,
    timezone: "Asia/Kolkata".to_string(),
    elevation_m: 584.0,
    provenance: Provenance::Network,
    last_updated: Utc.with_ymd_and_hms(2026, 6, 1, 5, 0, 0).unwrap(),
  }
}

pub fn cached_soil() -> SoilReading {
  SoilReading {
    soil_type: Some("Alluvial".to_string()),
    moisture_pct: 66,
    nutrients: Nutrients {
      nitrogen: 52.0,
      phosphorus: 31.0,
      potassium: 40.0,
    },
    ph: None,
    provenance: Provenance::Sensor,
    last_updated: Utc.with_ymd_and_hms(2026, 6, 1, 4, 45, 0).unwrap(),
  }
}

use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;
use url::Url;

use crate::api::api_types::{
  ApiRecommendationResponse, ApiSoilResponse, ApiWeatherResponse, ApiYieldResponse,
  RecommendationQuery, YieldQuery, CURRENT_WEATHER_FIELDS,
};
use crate::config::EndpointsConfig;
use crate::error::SyncError;
use crate::model::Coordinates;

/// Network endpoints the resolvers fetch fresh values from.
pub trait FieldApi: Send + Sync {
  fn current_weather(
    &self,
    at: Coordinates,
  ) -> impl Future<Output = Result<ApiWeatherResponse, SyncError>> + Send;

  fn soil_reading(
    &self,
    at: Option<Coordinates>,
  ) -> impl Future<Output = Result<ApiSoilResponse, SyncError>> + Send;

  fn yield_prediction(
    &self,
    query: &YieldQuery,
  ) -> impl Future<Output = Result<ApiYieldResponse, SyncError>> + Send;

  fn crop_recommendation(
    &self,
    query: &RecommendationQuery,
  ) -> impl Future<Output = Result<ApiRecommendationResponse, SyncError>> + Send;
}

/// HTTP client for the field service endpoints
#[derive(Clone)]
pub struct HttpFieldApi {
  client: reqwest::Client,
  endpoints: EndpointsConfig,
}

impl HttpFieldApi {
  pub fn new(endpoints: &EndpointsConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("fieldsync/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      endpoints: endpoints.clone(),
    })
  }

  /// GET `endpoint` with `query` and decode the JSON body.
  async fn get_json<T: DeserializeOwned>(
    &self,
    name: &str,
    endpoint: Option<&str>,
    query: &[(&str, String)],
  ) -> Result<T, SyncError> {
    let base = endpoint
      .ok_or_else(|| SyncError::network(format!("{} endpoint not configured", name)))?;
    let url = Url::parse_with_params(base, query)
      .map_err(|e| SyncError::network(format!("invalid {} endpoint {}: {}", name, base, e)))?;

    debug!(endpoint = name, %url, "fetching");

    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| SyncError::network(format!("{} request failed: {}", name, e)))?;

    let status = response.status();
    if !status.is_success() {
      return Err(SyncError::server(format!("{} returned {}", name, status)));
    }

    response
      .json::<T>()
      .await
      .map_err(|e| SyncError::server(format!("malformed {} payload: {}", name, e)))
  }
}

fn push_coordinates(query: &mut Vec<(&str, String)>, at: Option<Coordinates>) {
  if let Some(at) = at {
    query.push(("lat", at.latitude.to_string()));
    query.push(("lon", at.longitude.to_string()));
  }
}

impl FieldApi for HttpFieldApi {
  async fn current_weather(&self, at: Coordinates) -> Result<ApiWeatherResponse, SyncError> {
    let query = [
      ("latitude", at.latitude.to_string()),
      ("longitude", at.longitude.to_string()),
      ("current", CURRENT_WEATHER_FIELDS.to_string()),
      ("timezone", "auto".to_string()),
    ];
    self
      .get_json("weather", Some(self.endpoints.weather.as_str()), &query)
      .await
  }

  async fn soil_reading(&self, at: Option<Coordinates>) -> Result<ApiSoilResponse, SyncError> {
    let mut query = Vec::new();
    push_coordinates(&mut query, at);
    self
      .get_json("soil", self.endpoints.soil.as_deref(), &query)
      .await
  }

  async fn yield_prediction(&self, query: &YieldQuery) -> Result<ApiYieldResponse, SyncError> {
    let mut params = vec![
      ("crop", query.crop.clone()),
      ("area", query.area_hectares.to_string()),
    ];
    push_coordinates(&mut params, query.coordinates);
    if let Some(temperature) = query.temperature_c {
      params.push(("temperature", temperature.to_string()));
    }
    self
      .get_json(
        "yield prediction",
        self.endpoints.yield_prediction.as_deref(),
        &params,
      )
      .await
  }

  async fn crop_recommendation(
    &self,
    query: &RecommendationQuery,
  ) -> Result<ApiRecommendationResponse, SyncError> {
    let mut params = Vec::new();
    push_coordinates(&mut params, query.coordinates);
    if let Some(n) = query.nutrients {
      params.push(("N", n.nitrogen.to_string()));
      params.push(("P", n.phosphorus.to_string()));
      params.push(("K", n.potassium.to_string()));
    }
    if let Some(moisture) = query.moisture_pct {
      params.push(("moisture", moisture.to_string()));
    }
    if let Some(temperature) = query.temperature_c {
      params.push(("temperature", temperature.to_string()));
    }
    if let Some(humidity) = query.humidity_pct {
      params.push(("humidity", humidity.to_string()));
    }
    self
      .get_json(
        "crop recommendation",
        self.endpoints.crop_recommendation.as_deref(),
        &params,
      )
      .await
  }
}

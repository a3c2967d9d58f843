//! Serde types matching the field service responses and requests.
//!
//! These are kept apart from the domain types so deserialization stays
//! faithful to the wire while `model` stays focused on what the dashboard
//! shows. A payload missing a required field fails to parse and is treated
//! as a server error.

use serde::Deserialize;

use crate::model::{Coordinates, Nutrients};

// ============================================================================
// Weather endpoint (Open-Meteo compatible)
// ============================================================================

/// Variables requested in the `current` query parameter.
pub const CURRENT_WEATHER_FIELDS: &str =
  "temperature_2m,relative_humidity_2m,wind_speed_10m,cloud_cover,precipitation";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiWeatherResponse {
  pub timezone: String,
  #[serde(default)]
  pub elevation: f64,
  pub current: ApiCurrentWeather,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCurrentWeather {
  pub temperature_2m: f64,
  pub relative_humidity_2m: f64,
  pub wind_speed_10m: f64,
  pub cloud_cover: f64,
  pub precipitation: f64,
}

// ============================================================================
// Soil endpoint
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSoilResponse {
  #[serde(rename = "type", default)]
  pub soil_type: Option<String>,
  pub moisture: f64,
  pub nitrogen: f64,
  pub phosphorus: f64,
  pub potassium: f64,
  pub ph: Option<f64>,
  /// Set by IoT gateways reporting a hardware reading
  #[serde(default)]
  pub sensor: bool,
}

// ============================================================================
// Yield prediction endpoint
// ============================================================================

#[derive(Debug, Clone)]
pub struct YieldQuery {
  pub crop: String,
  pub area_hectares: f64,
  pub temperature_c: Option<f64>,
  pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiYieldResponse {
  pub per_hectare: ApiYieldFigures,
  pub total: ApiYieldFigures,
}

/// Each figure is a `[low, high]` pair.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiYieldFigures {
  pub fertilizer: [f64; 2],
  pub pesticide: [f64; 2],
  #[serde(rename = "yield")]
  pub crop_yield: [f64; 2],
}

// ============================================================================
// Crop recommendation endpoint
// ============================================================================

/// Context derived from whatever is cached when a recommendation is asked for.
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
  pub coordinates: Option<Coordinates>,
  pub nutrients: Option<Nutrients>,
  pub moisture_pct: Option<u8>,
  pub temperature_c: Option<f64>,
  pub humidity_pct: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecommendationResponse {
  pub crop: String,
  #[serde(default)]
  pub message: String,
  #[serde(rename = "N")]
  pub nitrogen: Option<f64>,
  #[serde(rename = "P")]
  pub phosphorus: Option<f64>,
  #[serde(rename = "K")]
  pub potassium: Option<f64>,
}

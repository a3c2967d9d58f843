//! Domain values shown on the dashboard.
//!
//! These are the normalized, strongly-typed forms. Wire shapes live in
//! `api::api_types` and are mapped into these at the resolver boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Independently cached and refreshed units of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
  Location,
  Soil,
  Weather,
  Crop,
  YieldPrediction,
  CropRecommendation,
}

impl fmt::Display for Domain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Domain::Location => "location",
      Domain::Soil => "soil",
      Domain::Weather => "weather",
      Domain::Crop => "crop",
      Domain::YieldPrediction => "yield prediction",
      Domain::CropRecommendation => "crop recommendation",
    };
    f.write_str(name)
  }
}

/// Where a value came from. Set once, by the path that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
  /// Live response from a network API
  Network,
  /// Live lookup from the device's location service
  Device,
  /// Reading reported by IoT hardware in the field
  Sensor,
  /// Synthesized offline because the live path failed
  Fallback { reason: String },
}

impl Provenance {
  pub fn fallback(reason: impl fmt::Display) -> Self {
    Provenance::Fallback {
      reason: reason.to_string(),
    }
  }

  pub fn is_from_sensor(&self) -> bool {
    matches!(self, Provenance::Sensor)
  }

  pub fn is_synthesized(&self) -> bool {
    matches!(self, Provenance::Fallback { .. })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude: f64,
  pub longitude: f64,
}

/// Device position with a human-readable place name.
///
/// Name and coordinates always change together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub display_name: String,
  pub latitude: f64,
  pub longitude: f64,
  pub provenance: Provenance,
}

impl Location {
  pub fn coordinates(&self) -> Coordinates {
    Coordinates {
      latitude: self.latitude,
      longitude: self.longitude,
    }
  }
}

/// Nitrogen, phosphorus and potassium levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
  pub nitrogen: f64,
  pub phosphorus: f64,
  pub potassium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
  /// Not every gateway classifies the soil
  #[serde(default)]
  pub soil_type: Option<String>,
  pub moisture_pct: u8,
  pub nutrients: Nutrients,
  pub ph: Option<f64>,
  pub provenance: Provenance,
  pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
  Clear,
  PartlyCloudy,
  Cloudy,
  Rainy,
}

impl WeatherCondition {
  /// Derive the sky condition. Any precipitation wins over cloud cover.
  pub fn derive(precipitation_mm: f64, cloud_cover_pct: u8) -> Self {
    if precipitation_mm > 0.0 {
      WeatherCondition::Rainy
    } else if cloud_cover_pct >= 80 {
      WeatherCondition::Cloudy
    } else if cloud_cover_pct >= 40 {
      WeatherCondition::PartlyCloudy
    } else {
      WeatherCondition::Clear
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
  pub temperature_c: f64,
  pub humidity_pct: u8,
  pub condition: WeatherCondition,
  pub wind_speed_kmh: f64,
  pub cloud_cover_pct: u8,
  pub precipitation_mm: f64,
  pub timezone: String,
  pub elevation_m: f64,
  pub provenance: Provenance,
  pub last_updated: DateTime<Utc>,
}

/// The crop the farmer is working with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CropSelection {
  /// Nothing chosen yet
  #[default]
  Unset,
  Chosen(String),
}

impl CropSelection {
  pub fn as_deref(&self) -> Option<&str> {
    match self {
      CropSelection::Unset => None,
      CropSelection::Chosen(name) => Some(name),
    }
  }
}

/// Inclusive `(low, high)` pair with `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
  pub low: f64,
  pub high: f64,
}

impl Range {
  /// Returns `None` for unordered or non-finite bounds.
  pub fn new(low: f64, high: f64) -> Option<Self> {
    (low.is_finite() && high.is_finite() && low <= high).then_some(Self { low, high })
  }

  pub fn scale(self, factor: f64) -> Self {
    Self {
      low: self.low * factor,
      high: self.high * factor,
    }
  }
}

/// Input and output estimates for one area unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldFigures {
  /// kg
  pub fertilizer: Range,
  /// litres
  pub pesticide: Range,
  /// tonnes
  #[serde(rename = "yield")]
  pub crop_yield: Range,
}

impl YieldFigures {
  pub fn scale(self, factor: f64) -> Self {
    Self {
      fertilizer: self.fertilizer.scale(factor),
      pesticide: self.pesticide.scale(factor),
      crop_yield: self.crop_yield.scale(factor),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPrediction {
  pub crop: String,
  pub area_hectares: f64,
  pub per_hectare: YieldFigures,
  pub total: YieldFigures,
  pub provenance: Provenance,
  pub predicted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecommendation {
  pub crop: String,
  pub message: String,
  pub soil_inputs: Option<Nutrients>,
  pub provenance: Provenance,
  pub recommended_at: DateTime<Utc>,
}

/// UI languages the dashboard ships translations for.
pub const LANGUAGES: &[(&str, &str)] = &[
  ("en", "English"),
  ("hi", "हिंदी"),
  ("ta", "தமிழ்"),
  ("te", "తెలుగు"),
  ("mr", "मराठी"),
];

pub const DEFAULT_LANGUAGE: &str = "en";

pub fn is_supported_language(code: &str) -> bool {
  LANGUAGES.iter().any(|(c, _)| *c == code)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_precipitation_dominates_cloud_cover() {
    assert_eq!(WeatherCondition::derive(0.2, 90), WeatherCondition::Rainy);
  }

  #[test]
  fn test_cloud_cover_thresholds() {
    assert_eq!(WeatherCondition::derive(0.0, 85), WeatherCondition::Cloudy);
    assert_eq!(WeatherCondition::derive(0.0, 80), WeatherCondition::Cloudy);
    assert_eq!(WeatherCondition::derive(0.0, 50), WeatherCondition::PartlyCloudy);
    assert_eq!(WeatherCondition::derive(0.0, 40), WeatherCondition::PartlyCloudy);
    assert_eq!(WeatherCondition::derive(0.0, 10), WeatherCondition::Clear);
  }

  #[test]
  fn test_range_rejects_unordered_bounds() {
    assert!(Range::new(2.0, 1.0).is_none());
    assert!(Range::new(f64::NAN, 1.0).is_none());
    assert_eq!(Range::new(1.0, 1.0), Some(Range { low: 1.0, high: 1.0 }));
  }

  #[test]
  fn test_provenance_flags() {
    assert!(Provenance::Sensor.is_from_sensor());
    assert!(!Provenance::Network.is_synthesized());
    assert!(Provenance::fallback("timeout").is_synthesized());
  }

  #[test]
  fn test_unset_crop_is_not_empty_string() {
    assert_eq!(CropSelection::Unset.as_deref(), None);
    assert_eq!(
      serde_json::to_value(CropSelection::Unset).unwrap(),
      serde_json::Value::Null
    );
    assert_eq!(
      serde_json::to_value(CropSelection::Chosen("rice".into())).unwrap(),
      "rice"
    );
  }

  #[test]
  fn test_supported_languages() {
    assert!(is_supported_language("ta"));
    assert!(!is_supported_language("fr"));
  }
}

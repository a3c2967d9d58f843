use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::Resolver;
use crate::api::api_types::{ApiYieldFigures, YieldQuery};
use crate::api::FieldApi;
use crate::error::SyncError;
use crate::model::{Domain, Provenance, Range, YieldFigures, YieldPrediction};

/// Largest field accepted for a prediction, in hectares. Keeps every scaled
/// total finite.
pub const MAX_AREA_HECTARES: f64 = 1_000_000.0;

/// Crop and area as typed by the farmer, validated before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldRequest {
  pub crop: String,
  pub area_hectares: f64,
}

impl YieldRequest {
  pub fn parse(crop: &str, area: &str) -> Result<Self, SyncError> {
    let crop = crop.trim();
    if crop.is_empty() {
      return Err(SyncError::validation("crop", "a crop name is required"));
    }

    let area_hectares: f64 = area
      .trim()
      .parse()
      .map_err(|_| SyncError::validation("area", format!("'{}' is not a number", area.trim())))?;
    if !area_hectares.is_finite() || area_hectares <= 0.0 {
      return Err(SyncError::validation(
        "area",
        "must be a positive number of hectares",
      ));
    }
    if area_hectares > MAX_AREA_HECTARES {
      return Err(SyncError::validation(
        "area",
        format!("must be at most {} hectares", MAX_AREA_HECTARES),
      ));
    }

    Ok(Self {
      crop: crop.to_string(),
      area_hectares,
    })
  }
}

pub struct YieldResolver<A> {
  api: Arc<A>,
}

impl<A: FieldApi> YieldResolver<A> {
  pub fn new(api: Arc<A>) -> Self {
    Self { api }
  }
}

fn range(field: &str, pair: [f64; 2]) -> Result<Range, SyncError> {
  Range::new(pair[0], pair[1])
    .ok_or_else(|| SyncError::server(format!("{} range {:?} is not ordered", field, pair)))
}

fn figures(figures: ApiYieldFigures) -> Result<YieldFigures, SyncError> {
  Ok(YieldFigures {
    fertilizer: range("fertilizer", figures.fertilizer)?,
    pesticide: range("pesticide", figures.pesticide)?,
    crop_yield: range("yield", figures.crop_yield)?,
  })
}

/// Typical per-hectare inputs and output used when the prediction service
/// cannot be reached. Fertilizer kg, pesticide litres, yield tonnes.
fn baseline(crop: &str) -> YieldFigures {
  let (fertilizer, pesticide, crop_yield) = match crop.to_lowercase().as_str() {
    "rice" | "paddy" => ((100.0, 150.0), (1.0, 2.0), (3.5, 5.0)),
    "wheat" => ((120.0, 160.0), (0.8, 1.5), (3.0, 4.5)),
    "maize" | "corn" => ((150.0, 200.0), (1.0, 1.8), (4.0, 6.0)),
    "cotton" => ((80.0, 120.0), (2.0, 3.5), (1.5, 2.5)),
    "sugarcane" => ((200.0, 300.0), (1.5, 2.5), (60.0, 80.0)),
    "soybean" => ((20.0, 40.0), (0.8, 1.2), (1.0, 2.0)),
    _ => ((100.0, 150.0), (1.0, 2.0), (2.0, 4.0)),
  };

  YieldFigures {
    fertilizer: Range {
      low: fertilizer.0,
      high: fertilizer.1,
    },
    pesticide: Range {
      low: pesticide.0,
      high: pesticide.1,
    },
    crop_yield: Range {
      low: crop_yield.0,
      high: crop_yield.1,
    },
  }
}

impl<A: FieldApi> Resolver for YieldResolver<A> {
  type Params = YieldQuery;
  type Value = YieldPrediction;

  const DOMAIN: Domain = Domain::YieldPrediction;

  async fn fetch_fresh(&self, query: &YieldQuery) -> Result<YieldPrediction, SyncError> {
    let response = self.api.yield_prediction(query).await?;

    Ok(YieldPrediction {
      crop: query.crop.clone(),
      area_hectares: query.area_hectares,
      per_hectare: figures(response.per_hectare)?,
      total: figures(response.total)?,
      provenance: Provenance::Network,
      predicted_at: Utc::now(),
    })
  }

  fn synthesize_fallback(
    &self,
    query: &YieldQuery,
    _cached: Option<YieldPrediction>,
    reason: &SyncError,
  ) -> Option<YieldPrediction> {
    debug!(crop = %query.crop, "using baseline yield estimate");
    let per_hectare = baseline(&query.crop);

    Some(YieldPrediction {
      crop: query.crop.clone(),
      area_hectares: query.area_hectares,
      per_hectare,
      total: per_hectare.scale(query.area_hectares),
      provenance: Provenance::fallback(reason),
      predicted_at: Utc::now(),
    })
  }
}

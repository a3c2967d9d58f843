use chrono::Utc;
use std::sync::Arc;

use super::{finite, Resolver};
use crate::api::api_types::{ApiRecommendationResponse, RecommendationQuery};
use crate::api::FieldApi;
use crate::error::SyncError;
use crate::model::{CropRecommendation, Domain, Nutrients, Provenance};

pub struct RecommendationResolver<A> {
  api: Arc<A>,
}

impl<A: FieldApi> RecommendationResolver<A> {
  pub fn new(api: Arc<A>) -> Self {
    Self { api }
  }
}

fn normalize(
  response: ApiRecommendationResponse,
  query: &RecommendationQuery,
) -> Result<CropRecommendation, SyncError> {
  let crop = response.crop.trim();
  if crop.is_empty() {
    return Err(SyncError::server("recommendation names no crop"));
  }

  let soil_inputs = match (response.nitrogen, response.phosphorus, response.potassium) {
    (Some(n), Some(p), Some(k)) => Some(Nutrients {
      nitrogen: finite("N", n)?,
      phosphorus: finite("P", p)?,
      potassium: finite("K", k)?,
    }),
    _ => query.nutrients,
  };

  let message = if response.message.trim().is_empty() {
    format!("{} suits the current field conditions", crop)
  } else {
    response.message.trim().to_string()
  };

  Ok(CropRecommendation {
    crop: crop.to_string(),
    message,
    soil_inputs,
    provenance: Provenance::Network,
    recommended_at: Utc::now(),
  })
}

/// Rule-of-thumb pick from whatever soil and weather data is cached.
fn offline_pick(query: &RecommendationQuery) -> (&'static str, String) {
  let moisture = query.moisture_pct;
  let temperature = query.temperature_c;
  let nitrogen = query.nutrients.map(|n| n.nitrogen);

  match (moisture, temperature, nitrogen) {
    (None, None, None) => (
      "millet",
      "No soil or weather data yet; millet tolerates most conditions".to_string(),
    ),
    (Some(m), _, _) if m >= 60 => (
      "rice",
      format!("Soil moisture of {}% suits paddy", m),
    ),
    (_, Some(t), _) if t < 20.0 => (
      "wheat",
      format!("Cool conditions ({:.1} °C) favour wheat", t),
    ),
    (_, _, Some(n)) if n >= 80.0 => (
      "maize",
      format!("Nitrogen-rich soil ({:.0}) supports maize", n),
    ),
    _ => (
      "millet",
      "Moderate moisture and nutrients suit millet".to_string(),
    ),
  }
}

impl<A: FieldApi> Resolver for RecommendationResolver<A> {
  type Params = RecommendationQuery;
  type Value = CropRecommendation;

  const DOMAIN: Domain = Domain::CropRecommendation;

  async fn fetch_fresh(&self, query: &RecommendationQuery) -> Result<CropRecommendation, SyncError> {
    let response = self.api.crop_recommendation(query).await?;
    normalize(response, query)
  }

  fn synthesize_fallback(
    &self,
    query: &RecommendationQuery,
    _cached: Option<CropRecommendation>,
    reason: &SyncError,
  ) -> Option<CropRecommendation> {
    let (crop, message) = offline_pick(query);

    Some(CropRecommendation {
      crop: crop.to_string(),
      message,
      soil_inputs: query.nutrients,
      provenance: Provenance::fallback(reason),
      recommended_at: Utc::now(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{recommendation_response, CallLog, MockApi, Reply};

  fn nutrients(nitrogen: f64) -> Nutrients {
    Nutrients {
      nitrogen,
      phosphorus: 30.0,
      potassium: 30.0,
    }
  }

  fn resolver() -> (RecommendationResolver<MockApi>, Arc<MockApi>) {
    let api = Arc::new(MockApi::new(CallLog::default()));
    (RecommendationResolver::new(Arc::clone(&api)), api)
  }

  #[tokio::test]
  async fn test_live_recommendation() {
    let (resolver, _) = resolver();

    let recommendation = resolver
      .fetch_fresh(&RecommendationQuery::default())
      .await
      .unwrap();

    assert_eq!(recommendation.crop, "soybean");
    assert_eq!(recommendation.soil_inputs.unwrap().phosphorus, 32.0);
    assert_eq!(recommendation.provenance, Provenance::Network);
  }

  #[tokio::test]
  async fn test_partial_nutrients_fall_back_to_query_inputs() {
    let (resolver, api) = resolver();
    let mut response = recommendation_response();
    response.potassium = None;
    response.message = String::new();
    api.set_recommendation(Reply::Ok(response));
    let query = RecommendationQuery {
      nutrients: Some(nutrients(50.0)),
      ..Default::default()
    };

    let recommendation = resolver.fetch_fresh(&query).await.unwrap();

    assert_eq!(recommendation.soil_inputs, Some(nutrients(50.0)));
    assert_eq!(
      recommendation.message,
      "soybean suits the current field conditions"
    );
  }

  #[test]
  fn test_offline_rules() {
    let wet = RecommendationQuery {
      moisture_pct: Some(72),
      temperature_c: Some(31.0),
      ..Default::default()
    };
    assert_eq!(offline_pick(&wet).0, "rice");

    let cool = RecommendationQuery {
      moisture_pct: Some(30),
      temperature_c: Some(16.5),
      ..Default::default()
    };
    assert_eq!(offline_pick(&cool).0, "wheat");

    let rich = RecommendationQuery {
      moisture_pct: Some(30),
      temperature_c: Some(26.0),
      nutrients: Some(nutrients(95.0)),
      ..Default::default()
    };
    assert_eq!(offline_pick(&rich).0, "maize");

    assert_eq!(offline_pick(&RecommendationQuery::default()).0, "millet");
  }

  #[test]
  fn test_fallback_is_synthesized_with_soil_inputs() {
    let (resolver, _) = resolver();
    let query = RecommendationQuery {
      nutrients: Some(nutrients(40.0)),
      moisture_pct: Some(35),
      temperature_c: Some(27.0),
      ..Default::default()
    };

    let recommendation = resolver
      .synthesize_fallback(&query, None, &SyncError::Timeout { after_ms: 5000 })
      .unwrap();

    assert!(recommendation.provenance.is_synthesized());
    assert_eq!(recommendation.crop, "millet");
    assert_eq!(recommendation.soil_inputs, Some(nutrients(40.0)));
  }
}

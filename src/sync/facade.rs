use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::inflight::InFlight;
use super::{Dashboard, Refreshed, SyncNotice};
use crate::api::api_types::{RecommendationQuery, YieldQuery};
use crate::api::FieldApi;
use crate::device::LocationProvider;
use crate::error::SyncError;
use crate::fetch::{self, bounded};
use crate::model::{
  is_supported_language, CropRecommendation, CropSelection, Domain, Location, SoilReading,
  WeatherReading, YieldPrediction, DEFAULT_LANGUAGE,
};
use crate::resolve::{
  LocationResolver, RecommendationResolver, Resolver, SoilResolver, WeatherResolver, YieldRequest,
  YieldResolver,
};
use crate::store::{keys, Persisted, Store};

#[derive(Default)]
struct Gates {
  location: InFlight<Refreshed<Option<Location>>>,
  weather: InFlight<Refreshed<Option<WeatherReading>>>,
  soil: InFlight<Refreshed<Option<SoilReading>>>,
  yields: InFlight<Refreshed<Option<YieldPrediction>>>,
  recommendation: InFlight<Refreshed<Option<CropRecommendation>>>,
}

/// Read-through cache over the field data sources.
///
/// Every `cached_*` read is answered from the store alone. Every refresh is
/// bounded by the configured timeout, never fails, and persists its outcome.
pub struct FieldSync<L, A> {
  store: Arc<dyn Store>,
  location: LocationResolver<L>,
  weather: WeatherResolver<A>,
  soil: SoilResolver<A>,
  yields: YieldResolver<A>,
  recommendation: RecommendationResolver<A>,
  timeout: Duration,
  gates: Gates,
  notices: Option<mpsc::UnboundedSender<SyncNotice>>,
}

impl<L: LocationProvider, A: FieldApi> FieldSync<L, A> {
  pub fn new(store: Arc<dyn Store>, device: L, api: Arc<A>) -> Self {
    Self {
      store,
      location: LocationResolver::new(device),
      weather: WeatherResolver::new(Arc::clone(&api)),
      soil: SoilResolver::new(Arc::clone(&api)),
      yields: YieldResolver::new(Arc::clone(&api)),
      recommendation: RecommendationResolver::new(api),
      timeout: fetch::DEFAULT_TIMEOUT,
      gates: Gates::default(),
      notices: None,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Forward every fallback's error to `sender` as it happens.
  pub fn with_notices(mut self, sender: mpsc::UnboundedSender<SyncNotice>) -> Self {
    self.notices = Some(sender);
    self
  }

  // Reads

  pub fn cached_location(&self) -> Option<Location> {
    Location::load(self.store.as_ref())
  }

  pub fn cached_soil(&self) -> Option<SoilReading> {
    SoilReading::load(self.store.as_ref())
  }

  pub fn cached_weather(&self) -> Option<WeatherReading> {
    WeatherReading::load(self.store.as_ref())
  }

  pub fn cached_crop(&self) -> CropSelection {
    CropSelection::load(self.store.as_ref()).unwrap_or_default()
  }

  pub fn cached_yield(&self) -> Option<YieldPrediction> {
    YieldPrediction::load(self.store.as_ref())
  }

  pub fn cached_recommendation(&self) -> Option<CropRecommendation> {
    CropRecommendation::load(self.store.as_ref())
  }

  pub fn language(&self) -> String {
    self
      .store
      .get(keys::SELECTED_LANGUAGE)
      .filter(|code| is_supported_language(code))
      .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
  }

  /// The dashboard's main block as currently stored.
  pub fn snapshot(&self) -> Dashboard {
    Dashboard {
      location: self.cached_location(),
      soil: self.cached_soil(),
      weather: self.cached_weather(),
      crop: self.cached_crop(),
      notices: Vec::new(),
    }
  }

  // Refreshes

  pub async fn refresh_location(&self) -> Refreshed<Option<Location>> {
    self
      .refresh_with(&self.location, &self.gates.location, ())
      .await
  }

  /// Without stored coordinates there is nothing to ask for, so the cached
  /// reading is returned as is.
  pub async fn refresh_weather(&self) -> Refreshed<Option<WeatherReading>> {
    let Some(location) = self.cached_location() else {
      debug!("no coordinates stored, skipping weather refresh");
      return Refreshed::live(self.cached_weather());
    };

    self
      .refresh_with(&self.weather, &self.gates.weather, location.coordinates())
      .await
  }

  pub async fn refresh_soil(&self) -> Refreshed<Option<SoilReading>> {
    let at = self.cached_location().map(|l| l.coordinates());
    self.refresh_with(&self.soil, &self.gates.soil, at).await
  }

  /// Validates the farmer's input before anything goes over the network.
  ///
  /// `temperature_c` defaults to the cached weather reading.
  pub async fn predict_yield(
    &self,
    crop: &str,
    area: &str,
    temperature_c: Option<f64>,
  ) -> Result<Refreshed<Option<YieldPrediction>>, SyncError> {
    let request = YieldRequest::parse(crop, area)?;
    if let Some(t) = temperature_c {
      if !t.is_finite() {
        return Err(SyncError::validation("temperature", "must be a number"));
      }
    }

    let query = YieldQuery {
      crop: request.crop,
      area_hectares: request.area_hectares,
      temperature_c: temperature_c.or_else(|| self.cached_weather().map(|w| w.temperature_c)),
      coordinates: self.cached_location().map(|l| l.coordinates()),
    };

    Ok(self.refresh_with(&self.yields, &self.gates.yields, query).await)
  }

  pub async fn refresh_recommendation(&self) -> Refreshed<Option<CropRecommendation>> {
    let soil = self.cached_soil();
    let weather = self.cached_weather();
    let query = RecommendationQuery {
      coordinates: self.cached_location().map(|l| l.coordinates()),
      nutrients: soil.as_ref().map(|s| s.nutrients),
      moisture_pct: soil.as_ref().map(|s| s.moisture_pct),
      temperature_c: weather.as_ref().map(|w| w.temperature_c),
      humidity_pct: weather.as_ref().map(|w| w.humidity_pct),
    };

    self
      .refresh_with(&self.recommendation, &self.gates.recommendation, query)
      .await
  }

  /// Location first, then weather for whatever coordinates that left in the
  /// store. Soil and crop are read from the cache.
  pub async fn refresh_all(&self) -> Dashboard {
    let location = self.refresh_location().await;
    let weather = self.refresh_weather().await;

    let notices = [
      location.notice(Domain::Location),
      weather.notice(Domain::Weather),
    ]
    .into_iter()
    .flatten()
    .collect();

    Dashboard {
      location: location.value,
      soil: self.cached_soil(),
      weather: weather.value,
      crop: self.cached_crop(),
      notices,
    }
  }

  // Writes

  pub fn set_crop(&self, name: &str) -> Result<CropSelection, SyncError> {
    let name = name.trim();
    if name.is_empty() {
      return Err(SyncError::validation("crop", "a crop name is required"));
    }

    let crop = CropSelection::Chosen(name.to_string());
    crop.save(self.store.as_ref());
    info!(crop = name, "crop selected");
    Ok(crop)
  }

  pub fn clear_crop(&self) {
    CropSelection::Unset.save(self.store.as_ref());
  }

  /// Select the crop of the stored recommendation, if there is one.
  pub fn accept_recommendation(&self) -> Option<CropSelection> {
    let recommendation = self.cached_recommendation()?;
    let crop = CropSelection::Chosen(recommendation.crop);
    crop.save(self.store.as_ref());
    Some(crop)
  }

  pub fn set_language(&self, code: &str) -> Result<(), SyncError> {
    let code = code.trim();
    if !is_supported_language(code) {
      return Err(SyncError::validation(
        "language",
        format!("'{}' is not a supported language", code),
      ));
    }

    self.store.set(keys::SELECTED_LANGUAGE, code);
    Ok(())
  }

  pub fn clear_location(&self) {
    Location::clear(self.store.as_ref());
    info!("location cleared");
  }

  async fn refresh_with<R: Resolver>(
    &self,
    resolver: &R,
    gate: &InFlight<Refreshed<Option<R::Value>>>,
    params: R::Params,
  ) -> Refreshed<Option<R::Value>> {
    let key = format!("{:?}", params);
    gate.run(&key, || self.resolve(resolver, &params)).await
  }

  /// One bounded attempt, falling back on any error. The outcome is
  /// persisted either way.
  async fn resolve<R: Resolver>(
    &self,
    resolver: &R,
    params: &R::Params,
  ) -> Refreshed<Option<R::Value>> {
    match bounded(self.timeout, || resolver.fetch_fresh(params)).await {
      Ok(value) => {
        value.save(self.store.as_ref());
        debug!(domain = %R::DOMAIN, "refreshed");
        Refreshed::live(Some(value))
      }
      Err(error) => {
        warn!(domain = %R::DOMAIN, %error, "refresh failed, falling back");
        let cached = <R::Value as Persisted>::load(self.store.as_ref());
        let fallback = resolver.synthesize_fallback(params, cached, &error);
        if let Some(value) = &fallback {
          value.save(self.store.as_ref());
        }
        self.notify(R::DOMAIN, &error);
        Refreshed::fallback(fallback, error)
      }
    }
  }

  fn notify(&self, domain: Domain, error: &SyncError) {
    let Some(sender) = &self.notices else {
      return;
    };
    let notice = SyncNotice {
      domain,
      error: error.clone(),
    };
    if sender.send(notice).is_err() {
      debug!("notice receiver dropped");
    }
  }
}

//! Mapping between domain values and store keys.

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::storage::Store;
use crate::model::{
  CropRecommendation, CropSelection, Location, Provenance, SoilReading, WeatherReading,
  YieldPrediction,
};

/// Store keys, one per scalar or JSON-serialized field.
pub mod keys {
  pub const USER_LOCATION: &str = "userLocation";
  pub const USER_LATITUDE: &str = "userLatitude";
  pub const USER_LONGITUDE: &str = "userLongitude";
  pub const USER_LOCATION_SOURCE: &str = "userLocationSource";
  pub const SELECTED_LANGUAGE: &str = "selectedLanguage";
  pub const SOIL_DATA: &str = "soilData";
  pub const WEATHER_DATA: &str = "weatherData";
  pub const CROP_DATA: &str = "cropData";
  pub const YIELD_PREDICTION: &str = "yieldPrediction";
  pub const CROP_RECOMMENDATION: &str = "cropRecommendation";
}

/// A domain value that can be read from and written to a [`Store`].
pub trait Persisted: Sized {
  /// Read the value, `None` when absent or unreadable.
  fn load(store: &dyn Store) -> Option<Self>;

  /// Write the value. The primary key is always written first.
  fn save(&self, store: &dyn Store);
}

fn load_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Option<T> {
  let raw = store.get(key)?;
  match serde_json::from_str(&raw) {
    Ok(value) => Some(value),
    Err(e) => {
      warn!(key, error = %e, "ignoring unreadable cached value");
      None
    }
  }
}

fn save_json<T: Serialize>(store: &dyn Store, key: &str, value: &T) {
  match serde_json::to_string(value) {
    Ok(raw) => store.set(key, &raw),
    Err(e) => warn!(key, error = %e, "failed to serialize value for store"),
  }
}

macro_rules! json_field {
  ($ty:ty, $key:expr) => {
    impl Persisted for $ty {
      fn load(store: &dyn Store) -> Option<Self> {
        load_json(store, $key)
      }

      fn save(&self, store: &dyn Store) {
        save_json(store, $key, self)
      }
    }
  };
}

json_field!(SoilReading, keys::SOIL_DATA);
json_field!(WeatherReading, keys::WEATHER_DATA);
json_field!(YieldPrediction, keys::YIELD_PREDICTION);
json_field!(CropRecommendation, keys::CROP_RECOMMENDATION);

impl Persisted for Location {
  /// Name and both coordinates must be present; anything less reads as no
  /// location. Entries written without a source came from a device lookup.
  fn load(store: &dyn Store) -> Option<Self> {
    let display_name = store.get(keys::USER_LOCATION)?;
    let latitude = store.get(keys::USER_LATITUDE)?.parse().ok()?;
    let longitude = store.get(keys::USER_LONGITUDE)?.parse().ok()?;
    let provenance =
      load_json(store, keys::USER_LOCATION_SOURCE).unwrap_or(Provenance::Device);

    Some(Location {
      display_name,
      latitude,
      longitude,
      provenance,
    })
  }

  fn save(&self, store: &dyn Store) {
    store.set(keys::USER_LOCATION, &self.display_name);
    store.set(keys::USER_LATITUDE, &self.latitude.to_string());
    store.set(keys::USER_LONGITUDE, &self.longitude.to_string());
    save_json(store, keys::USER_LOCATION_SOURCE, &self.provenance);
  }
}

impl Location {
  /// Remove name and coordinates together. Derived keys go first so no
  /// reader sees coordinates without a name.
  pub fn clear(store: &dyn Store) {
    store.remove(keys::USER_LATITUDE);
    store.remove(keys::USER_LONGITUDE);
    store.remove(keys::USER_LOCATION_SOURCE);
    store.remove(keys::USER_LOCATION);
  }
}

impl Persisted for CropSelection {
  fn load(store: &dyn Store) -> Option<Self> {
    let name = store.get(keys::CROP_DATA)?;
    if name.trim().is_empty() {
      return None;
    }
    Some(CropSelection::Chosen(name))
  }

  fn save(&self, store: &dyn Store) {
    match self {
      CropSelection::Unset => store.remove(keys::CROP_DATA),
      CropSelection::Chosen(name) => store.set(keys::CROP_DATA, name),
    }
  }
}

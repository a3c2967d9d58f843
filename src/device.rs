//! Device location collaborator.

use std::future::Future;

use crate::config::DeviceConfig;
use crate::error::SyncError;
use crate::model::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
  Granted,
  Denied,
}

/// Postal address parts from reverse geocoding. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
  pub city: Option<String>,
  pub district: Option<String>,
  pub region: Option<String>,
  pub country: Option<String>,
}

impl Address {
  /// "City, Region", falling back to district and country, then "Unknown".
  pub fn display_name(&self) -> String {
    let place = self
      .city
      .as_deref()
      .or(self.district.as_deref())
      .unwrap_or("Unknown");
    let area = self
      .region
      .as_deref()
      .or(self.country.as_deref())
      .unwrap_or("Unknown");
    format!("{}, {}", place, area)
  }
}

/// Access to the device's position.
pub trait LocationProvider: Send + Sync {
  fn request_permission(&self) -> impl Future<Output = Permission> + Send;

  fn current_coordinates(&self) -> impl Future<Output = Result<Coordinates, SyncError>> + Send;

  fn reverse_geocode(
    &self,
    at: Coordinates,
  ) -> impl Future<Output = Result<Address, SyncError>> + Send;
}

/// Provider reporting the position written in the `device` config section.
///
/// A device without a configured position behaves like one where the user
/// refused location access.
#[derive(Debug, Clone)]
pub struct ConfiguredDevice {
  device: Option<DeviceConfig>,
}

impl ConfiguredDevice {
  pub fn new(device: Option<DeviceConfig>) -> Self {
    Self { device }
  }

  fn configured(&self) -> Result<&DeviceConfig, SyncError> {
    self.device.as_ref().ok_or(SyncError::PermissionDenied)
  }
}

impl LocationProvider for ConfiguredDevice {
  async fn request_permission(&self) -> Permission {
    if self.device.is_some() {
      Permission::Granted
    } else {
      Permission::Denied
    }
  }

  async fn current_coordinates(&self) -> Result<Coordinates, SyncError> {
    let device = self.configured()?;
    Ok(Coordinates {
      latitude: device.latitude,
      longitude: device.longitude,
    })
  }

  async fn reverse_geocode(&self, _at: Coordinates) -> Result<Address, SyncError> {
    let device = self.configured()?;
    Ok(Address {
      city: device.city.clone(),
      district: device.district.clone(),
      region: device.region.clone(),
      country: device.country.clone(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display_name_prefers_city_and_region() {
    let address = Address {
      city: Some("Nashik".into()),
      district: Some("Nashik District".into()),
      region: Some("Maharashtra".into()),
      country: Some("India".into()),
    };
    assert_eq!(address.display_name(), "Nashik, Maharashtra");
  }

  #[test]
  fn test_display_name_falls_back() {
    let address = Address {
      district: Some("Madurai".into()),
      country: Some("India".into()),
      ..Default::default()
    };
    assert_eq!(address.display_name(), "Madurai, India");
    assert_eq!(Address::default().display_name(), "Unknown, Unknown");
  }

  #[tokio::test]
  async fn test_unconfigured_device_denies_permission() {
    let device = ConfiguredDevice::new(None);
    assert_eq!(device.request_permission().await, Permission::Denied);
    assert_eq!(
      device.current_coordinates().await,
      Err(SyncError::PermissionDenied)
    );
  }
}

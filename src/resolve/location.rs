use tracing::{info, warn};

use super::Resolver;
use crate::device::{LocationProvider, Permission};
use crate::error::SyncError;
use crate::model::{Domain, Location, Provenance};

/// Looks up the device position and names it.
pub struct LocationResolver<L> {
  provider: L,
}

impl<L: LocationProvider> LocationResolver<L> {
  pub fn new(provider: L) -> Self {
    Self { provider }
  }
}

impl<L: LocationProvider> Resolver for LocationResolver<L> {
  type Params = ();
  type Value = Location;

  const DOMAIN: Domain = Domain::Location;

  async fn fetch_fresh(&self, _params: &()) -> Result<Location, SyncError> {
    if self.provider.request_permission().await == Permission::Denied {
      return Err(SyncError::PermissionDenied);
    }

    let at = self.provider.current_coordinates().await?;

    // A position without a place name is still worth keeping
    let address = match self.provider.reverse_geocode(at).await {
      Ok(address) => address,
      Err(e) => {
        warn!(error = %e, "reverse geocoding failed, keeping coordinates");
        Default::default()
      }
    };

    let location = Location {
      display_name: address.display_name(),
      latitude: at.latitude,
      longitude: at.longitude,
      provenance: Provenance::Device,
    };
    info!(name = %location.display_name, "device location resolved");

    Ok(location)
  }

  /// Positions are never invented; the last known one stays in place,
  /// marked as stale.
  fn synthesize_fallback(
    &self,
    _params: &(),
    cached: Option<Location>,
    reason: &SyncError,
  ) -> Option<Location> {
    cached.map(|location| Location {
      provenance: Provenance::fallback(reason),
      ..location
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{nashik, pune, CallLog, MockDevice, Reply};

  #[tokio::test]
  async fn test_resolves_name_and_coordinates_together() {
    let resolver = LocationResolver::new(MockDevice::new(CallLog::default()));

    let location = resolver.fetch_fresh(&()).await.unwrap();

    assert_eq!(location, nashik());
  }

  #[tokio::test]
  async fn test_denied_permission() {
    let log = CallLog::default();
    let resolver = LocationResolver::new(MockDevice::denied(log.clone()));

    let err = resolver.fetch_fresh(&()).await.unwrap_err();

    assert_eq!(err, SyncError::PermissionDenied);
    assert_eq!(log.count("location:coordinates"), 0);
  }

  #[tokio::test]
  async fn test_geocode_failure_keeps_coordinates() {
    let mut device = MockDevice::new(CallLog::default());
    device.address = Reply::Fail(SyncError::network("geocoder offline"));
    let resolver = LocationResolver::new(device);

    let location = resolver.fetch_fresh(&()).await.unwrap();

    assert_eq!(location.display_name, "Unknown, Unknown");
    assert_eq!(location.coordinates(), nashik().coordinates());
  }

  #[test]
  fn test_fallback_is_cached_location_marked_stale() {
    let resolver = LocationResolver::new(MockDevice::new(CallLog::default()));

    let location = resolver
      .synthesize_fallback(&(), Some(pune()), &SyncError::PermissionDenied)
      .unwrap();

    assert_eq!(location.display_name, pune().display_name);
    assert_eq!(location.coordinates(), pune().coordinates());
    assert_eq!(
      location.provenance,
      Provenance::Fallback {
        reason: "location permission denied".to_string()
      }
    );
    assert_eq!(
      resolver.synthesize_fallback(&(), None, &SyncError::PermissionDenied),
      None
    );
  }
}

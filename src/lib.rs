//! Offline-first sync layer for a farm field dashboard.
//!
//! Location, soil, weather, crop, yield and recommendation values are read
//! from a persistent store and refreshed from their sources with a bounded
//! wait. When a source fails the last known or a synthesized value is kept,
//! tagged with where it came from.

pub mod api;
pub mod config;
pub mod device;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod resolve;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;

pub use error::SyncError;
pub use sync::{Dashboard, FieldSync, Refreshed, SyncNotice};

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::DEFAULT_TIMEOUT;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub endpoints: EndpointsConfig,
  /// Deadline for every network refresh, in milliseconds
  pub fetch_timeout_ms: u64,
  /// Position reported by this device; location access is denied when unset
  pub device: Option<DeviceConfig>,
  /// Override for the store and log directory
  pub data_dir: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      endpoints: EndpointsConfig::default(),
      fetch_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
      device: None,
      data_dir: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointsConfig {
  pub weather: String,
  pub soil: Option<String>,
  pub yield_prediction: Option<String>,
  pub crop_recommendation: Option<String>,
}

impl Default for EndpointsConfig {
  fn default() -> Self {
    Self {
      weather: "https://api.open-meteo.com/v1/forecast".to_string(),
      soil: None,
      yield_prediction: None,
      crop_recommendation: None,
    }
  }
}

/// Fixed device position with its postal address parts.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeviceConfig {
  pub latitude: f64,
  pub longitude: f64,
  pub city: Option<String>,
  pub district: Option<String>,
  pub region: Option<String>,
  pub country: Option<String>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./fieldsync.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/fieldsync/config.yaml
  ///
  /// With no file found the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };
    config.apply_env();

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("fieldsync.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("fieldsync").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// FIELDSYNC_WEATHER_URL points the weather resolver at another server.
  fn apply_env(&mut self) {
    if let Ok(url) = std::env::var("FIELDSYNC_WEATHER_URL") {
      self.endpoints.weather = url;
    }
  }

  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_millis(self.fetch_timeout_ms)
  }

  /// Directory holding the store and the log files.
  pub fn data_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.data_dir {
      return Ok(dir.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("fieldsync"))
  }
}

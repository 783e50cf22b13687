//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the backend and geocoder endpoints and the initial map view.
//!
//! Configuration is stored at `~/.config/oaracle/config.json`. Any field
//! missing from the file takes its default, and a few endpoints can be
//! overridden from the environment (or a `.env` file loaded by the binary).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::GeoPoint;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "oaracle";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "OARACLE_API_URL";
pub const ENV_GEOCODER_URL: &str = "OARACLE_GEOCODER_URL";
pub const ENV_GEOLOCATION_URL: &str = "OARACLE_GEOLOCATION_URL";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json/";

/// Centre of Great Britain, which frames the whole island at zoom 6.
const DEFAULT_MAP_CENTER: GeoPoint = GeoPoint::new(54.0, -2.0);
const DEFAULT_MAP_ZOOM: u8 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the conditions backend, without the `/api/...` path
    pub api_base_url: String,
    /// Nominatim-compatible reverse geocoding endpoint
    pub geocoder_url: String,
    /// IP geolocation endpoint used for "locate me"
    pub geolocation_url: String,
    /// Sent with every request; Nominatim rejects anonymous clients
    pub user_agent: String,
    pub map_center: GeoPoint,
    pub map_zoom: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            user_agent: format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")),
            map_center: DEFAULT_MAP_CENTER,
            map_zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

impl Config {
    /// Load from the standard location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path(&Self::config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            debug!(path = %path.display(), "Config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Remember the map view for the next start. Only the view fields are
    /// written; the rest of the file (and not the env overrides) is kept.
    pub fn save_view(center: GeoPoint, zoom: u8) -> Result<()> {
        Self::save_view_to_path(&Self::config_path()?, center, zoom)
    }

    pub fn save_view_to_path(path: &Path, center: GeoPoint, zoom: u8) -> Result<()> {
        let mut stored = Self::load_from_path(path)?;
        stored.map_center = center;
        stored.map_zoom = zoom;
        stored.save_to_path(path)?;
        debug!(path = %path.display(), zoom, "Map view saved");
        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override endpoints from environment variables. The lookup is passed in
    /// so tests do not have to touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = non_empty(ENV_GEOCODER_URL) {
            self.geocoder_url = url;
        }
        if let Some(url) = non_empty(ENV_GEOLOCATION_URL) {
            self.geolocation_url = url;
        }
    }

    /// `{api_base_url}/api/{path}` with exactly one slash at the join.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the rolling log files written by the terminal UI.
    pub fn log_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join("logs"))
    }
}

//! Configuration schema definitions
//!
//! Mirrors the sections of `pharmalink.toml`. Every field has a default, so
//! an empty file (or no file at all) is a valid configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub short_links: ShortLinkConfig,

    #[serde(default)]
    pub proximity: ProximityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let endpoint = &self.geocoding.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(Error::invalid_config_value(
                "geocoding.endpoint",
                "must start with http:// or https://",
            ));
        }
        if self.geocoding.timeout_secs == 0 {
            return Err(Error::invalid_config_value("geocoding.timeout_secs", "cannot be zero"));
        }
        if self.short_links.timeout_secs == 0 {
            return Err(Error::invalid_config_value("short_links.timeout_secs", "cannot be zero"));
        }

        let radius = self.proximity.default_radius_km;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::invalid_config_value(
                "proximity.default_radius_km",
                format!("{radius} is not a positive distance"),
            ));
        }

        let origin = &self.proximity.fallback_origin;
        if !(-90.0..=90.0).contains(&origin.latitude) || !(-180.0..=180.0).contains(&origin.longitude) {
            return Err(Error::invalid_config_value(
                "proximity.fallback_origin",
                format!("({}, {}) is out of range", origin.latitude, origin.longitude),
            ));
        }

        Ok(())
    }
}

/// Google Geocoding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// API key; geocoding is disabled when absent
    #[serde(default)]
    pub api_key: Option<String>,

    /// Geocoding JSON endpoint
    #[serde(default = "default_geocode_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_geocode_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_geocode_endpoint(),
            timeout_secs: default_geocode_timeout(),
        }
    }
}

fn default_geocode_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_geocode_timeout() -> u64 {
    10
}

/// Short-link resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortLinkConfig {
    /// Hosts treated as short links; replaces the built-in list when set
    #[serde(default)]
    pub domains: Option<Vec<String>>,

    /// Maximum redirects to follow
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Resolution timeout in seconds
    #[serde(default = "default_short_link_timeout")]
    pub timeout_secs: u64,
}

impl Default for ShortLinkConfig {
    fn default() -> Self {
        Self {
            domains: None,
            max_redirects: default_max_redirects(),
            timeout_secs: default_short_link_timeout(),
        }
    }
}

fn default_max_redirects() -> usize {
    5
}

fn default_short_link_timeout() -> u64 {
    5
}

/// Nearby-search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Radius used when a query does not specify one
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,

    /// Origin used when the patient's location is unknown
    #[serde(default)]
    pub fallback_origin: OriginConfig,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            fallback_origin: OriginConfig::default(),
        }
    }
}

fn default_radius_km() -> f64 {
    50.0
}

/// A latitude/longitude pair in the config file
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OriginConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Riyadh
impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            latitude: 24.7136,
            longitude: 46.6753,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

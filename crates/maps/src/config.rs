//! Configuration for the maps client
//!
//! An explicit struct handed to constructors. A missing API key is a valid
//! state: geocoding then reports `MissingApiKey` without touching the network.

use crate::error::{MapsError, MapsResult};
use pharmalink_core::config::{Config, ConfigSchema};
use pharmalink_geo::DEFAULT_SHORT_LINK_DOMAINS;
use std::fmt;
use std::time::Duration;

/// Default Google Geocoding JSON endpoint
pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Maps client configuration
#[derive(Clone)]
pub struct MapsConfig {
    /// Google Maps API key
    pub api_key: Option<String>,
    /// Geocoding endpoint URL
    pub geocode_endpoint: String,
    /// Geocoding request timeout
    pub geocode_timeout: Duration,
    /// Hosts treated as short links
    pub short_link_domains: Vec<String>,
    /// Maximum redirects followed when resolving a short link
    pub max_redirects: usize,
    /// Short-link resolution timeout
    pub short_link_timeout: Duration,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocode_endpoint: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            geocode_timeout: Duration::from_secs(10),
            short_link_domains: DEFAULT_SHORT_LINK_DOMAINS.iter().map(|d| d.to_string()).collect(),
            max_redirects: 5,
            short_link_timeout: Duration::from_secs(5),
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("geocode_endpoint", &self.geocode_endpoint)
            .field("geocode_timeout", &self.geocode_timeout)
            .field("short_link_domains", &self.short_link_domains)
            .field("max_redirects", &self.max_redirects)
            .field("short_link_timeout", &self.short_link_timeout)
            .finish()
    }
}

impl MapsConfig {
    /// Build from a loaded `pharmalink.toml` schema
    pub fn from_schema(schema: &ConfigSchema) -> Self {
        let defaults = Self::default();
        Self {
            api_key: schema
                .geocoding
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            geocode_endpoint: schema.geocoding.endpoint.clone(),
            geocode_timeout: Duration::from_secs(schema.geocoding.timeout_secs),
            short_link_domains: schema
                .short_links
                .domains
                .clone()
                .unwrap_or(defaults.short_link_domains),
            max_redirects: schema.short_links.max_redirects,
            short_link_timeout: Duration::from_secs(schema.short_links.timeout_secs),
        }
    }

    /// Create configuration from the standard config file locations and
    /// environment variables
    ///
    /// Reads `GOOGLE_MAPS_API_KEY` (or `NEXT_PUBLIC_GOOGLE_MAPS_API_KEY`),
    /// `PHARMALINK_GEOCODE_ENDPOINT` and `PHARMALINK_GEOCODE_TIMEOUT_SECS`.
    pub fn from_env() -> MapsResult<Self> {
        let config = Config::load(None).map_err(|e| MapsError::config(e.message))?;
        Ok(Self::from_schema(&config.schema))
    }

    /// Builder-style method to set the API key
    ///
    /// A blank key leaves the configuration without one.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|k| !k.trim().is_empty());
        self
    }

    /// Builder-style method to set the geocoding endpoint
    #[must_use]
    pub fn with_geocode_endpoint(mut self, url: impl Into<String>) -> Self {
        self.geocode_endpoint = url.into();
        self
    }

    /// Builder-style method to set the geocoding timeout
    #[must_use]
    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// Builder-style method to replace the short-link domains
    #[must_use]
    pub fn with_short_link_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.short_link_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style method to set the redirect cap
    #[must_use]
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Builder-style method to set the short-link timeout
    #[must_use]
    pub fn with_short_link_timeout(mut self, timeout: Duration) -> Self {
        self.short_link_timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> MapsResult<()> {
        if self.geocode_endpoint.is_empty() {
            return Err(MapsError::config("geocode_endpoint cannot be empty"));
        }

        if !self.geocode_endpoint.starts_with("http://") && !self.geocode_endpoint.starts_with("https://") {
            return Err(MapsError::config("geocode_endpoint must start with http:// or https://"));
        }

        if self.geocode_timeout.is_zero() || self.short_link_timeout.is_zero() {
            return Err(MapsError::config("timeouts cannot be zero"));
        }

        Ok(())
    }
}

//! Address geocoding against the Google Geocoding JSON API

use crate::client::Transport;
use crate::config::MapsConfig;
use crate::error::MapsError;
use crate::lookup::{LocationSource, Lookup, LookupMiss, ResolvedLocation};
use pharmalink_geo::GeoCoordinate;
use pharmalink_telemetry::Timer;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Geocoding client
///
/// Issues at most one request per call and never retries.
#[derive(Clone)]
pub struct GeocodingClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    api_key: Option<String>,
}

impl GeocodingClient {
    /// Create a geocoder sending requests through `transport`
    ///
    /// A blank API key counts as no key.
    pub fn new(config: &MapsConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            endpoint: config.geocode_endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        }
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Geocode a free-text address
    ///
    /// Returns the first result. Empty input and a missing key are answered
    /// without a request being made.
    #[instrument(skip(self))]
    pub async fn geocode(&self, address: &str) -> Lookup {
        let address = address.trim();
        if address.is_empty() {
            return Lookup::NotFound(LookupMiss::EmptyInput);
        }

        let Some(key) = self.api_key.as_deref() else {
            warn!("Geocoding skipped: no API key configured");
            return Lookup::NotFound(LookupMiss::MissingApiKey);
        };

        let _timer = Timer::start("geocode.latency_ms");
        let query = [("address", address), ("key", key)];

        match self.transport.get_json(&self.endpoint, &query).await {
            Ok(body) => interpret(body),
            Err(MapsError::ApiResponse { status, message }) => {
                // Some proxies answer errors with a normal geocoder body.
                match serde_json::from_str::<GeocodeResponse>(&message) {
                    Ok(response) if response.status != STATUS_OK => {
                        Lookup::NotFound(status_miss(response))
                    }
                    _ => {
                        warn!(status, "Geocoding request failed");
                        Lookup::NotFound(LookupMiss::Network(format!("HTTP {status}")))
                    }
                }
            }
            Err(MapsError::Json(e)) => {
                warn!(error = %e, "Geocoding response was not JSON");
                Lookup::NotFound(LookupMiss::MalformedResponse(e.to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Geocoding request failed");
                Lookup::NotFound(LookupMiss::Network(e.to_string()))
            }
        }
    }
}

fn status_miss(response: GeocodeResponse) -> LookupMiss {
    if response.status == STATUS_ZERO_RESULTS {
        return LookupMiss::NoResults;
    }
    warn!(
        status = %response.status,
        error_message = response.error_message.as_deref().unwrap_or(""),
        "Geocoder rejected request"
    );
    LookupMiss::Status(response.status)
}

fn interpret(body: Value) -> Lookup {
    let response: GeocodeResponse = match serde_json::from_value(body) {
        Ok(response) => response,
        Err(e) => return Lookup::NotFound(LookupMiss::MalformedResponse(e.to_string())),
    };

    if response.status != STATUS_OK {
        return Lookup::NotFound(status_miss(response));
    }

    let Some(first) = response.results.into_iter().next() else {
        debug!("Geocoder returned OK with no results");
        return Lookup::NotFound(LookupMiss::NoResults);
    };

    let result: GeocodeResult = match serde_json::from_value(first) {
        Ok(result) => result,
        Err(e) => return Lookup::NotFound(LookupMiss::MalformedResponse(e.to_string())),
    };

    let LatLng { lat, lng } = result.geometry.location;
    match GeoCoordinate::new(lat, lng) {
        Ok(coordinate) => Lookup::Found(
            ResolvedLocation::new(coordinate, LocationSource::Geocoded)
                .with_formatted_address(result.formatted_address),
        ),
        Err(e) => Lookup::NotFound(LookupMiss::MalformedResponse(e.to_string())),
    }
}

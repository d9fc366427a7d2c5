//! Location resolution and proximity utilities for PharmaLink.
//!
//! This crate provides:
//! - A validated [`GeoCoordinate`] value type
//! - Coordinate extraction from Google Maps links (pure pattern matching)
//! - Haversine distance calculations
//! - Nearby-pharmacy filtering with optional parallelism
//! - Parsing of location data from pharmacy store rows
//! - WASM bindings for the map UI
//!
//! Network-backed work (short-link resolution, geocoding) lives in
//! `pharmalink-maps`; everything here is deterministic.
//!
//! # Example
//!
//! ```
//! use pharmalink_geo::{extract_coordinates, haversine_distance, GeoCoordinate};
//!
//! let pharmacy = extract_coordinates("https://www.google.com/maps/place/Pharmacie/@36.7538,3.0588,15z")
//!     .expect("link carries coordinates");
//! let patient = GeoCoordinate::new(36.7762, 3.0588).unwrap();
//!
//! let distance_km = haversine_distance(&pharmacy, &patient);
//! assert!((distance_km - 2.49).abs() < 0.05);
//! ```

#![warn(missing_docs)]

mod error;
pub mod extract;
mod haversine;
pub mod location;
pub mod maps;
pub mod proximity;

#[cfg(feature = "wasm")]
mod wasm;

pub use error::{GeoError, GeoErrorCode, Result};
pub use extract::{extract_coordinates, is_short_link, short_link_url, DEFAULT_SHORT_LINK_DOMAINS};
pub use haversine::{haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M};
pub use location::{candidates_from_rows, parse_location, parse_wkt_point};
pub use maps::{centroid, directions_url, place_url};
pub use proximity::{
    count_nearby, distances, nearby, Candidate, NearbyResult, ProximityQuery, DEFAULT_RADIUS_KM,
    FALLBACK_ORIGIN,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic coordinate with latitude and longitude.
///
/// Both components are always finite and in range; every constructor
/// (including deserialization) validates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

/// Unvalidated wire form, accepting both `latitude/longitude` and `lat/lng`.
#[derive(Deserialize)]
struct RawCoordinate {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    longitude: f64,
}

impl GeoCoordinate {
    /// Creates a coordinate, rejecting NaN, infinities and out-of-range values.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        Self::try_new(latitude, longitude)
            .ok_or(GeoError::InvalidCoordinate { latitude, longitude })
    }

    /// Like [`GeoCoordinate::new`], but returns `None` instead of an error.
    #[inline]
    pub fn try_new(latitude: f64, longitude: f64) -> Option<Self> {
        is_valid_pair(latitude, longitude).then_some(Self { latitude, longitude })
    }

    /// Latitude in degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }

    /// Compile-time constructor for known-good constants.
    pub(crate) const fn from_trusted(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Returns true if both components are finite and within range.
#[inline]
pub fn is_valid_pair(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

impl TryFrom<(f64, f64)> for GeoCoordinate {
    type Error = GeoError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self> {
        Self::new(lat, lng)
    }
}

impl TryFrom<RawCoordinate> for GeoCoordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

/// Six decimal places, the precision shown on the admin map.
impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

//! Lookup outcomes
//!
//! Every public lookup returns a [`Lookup`]. Transport failures, upstream
//! status codes and malformed bodies all become a [`LookupMiss`] so callers
//! only branch on found / not found.

use pharmalink_geo::GeoCoordinate;
use serde::Serialize;
use std::fmt;

/// Where a resolved coordinate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// Parsed straight out of a full map link
    MapLink,
    /// Parsed from the URL a short link redirected to
    ResolvedShortLink,
    /// Returned by the geocoding service
    Geocoded,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MapLink => "map link",
            Self::ResolvedShortLink => "short link",
            Self::Geocoded => "geocoded",
        })
    }
}

/// A coordinate plus its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    /// Resolved position
    pub coordinate: GeoCoordinate,
    /// How the position was obtained
    pub source: LocationSource,
    /// Address echoed by the geocoder, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

impl ResolvedLocation {
    /// Location without a formatted address
    pub fn new(coordinate: GeoCoordinate, source: LocationSource) -> Self {
        Self {
            coordinate,
            source,
            formatted_address: None,
        }
    }

    /// Attach the geocoder's formatted address
    #[must_use]
    pub fn with_formatted_address(mut self, address: Option<String>) -> Self {
        self.formatted_address = address;
        self
    }
}

/// Why a lookup produced no coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum LookupMiss {
    /// Input was empty or whitespace
    EmptyInput,
    /// No geocoding API key configured
    MissingApiKey,
    /// Link contained no recognizable coordinate pair
    NoCoordinates,
    /// Geocoder answered OK with zero results, or `ZERO_RESULTS`
    NoResults,
    /// Geocoder answered with another status (`REQUEST_DENIED`, ...)
    Status(String),
    /// Transport failure or timeout
    Network(String),
    /// Body could not be interpreted
    MalformedResponse(String),
}

impl LookupMiss {
    /// Stable slug used in metric names and JSON output
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::MissingApiKey => "missing_api_key",
            Self::NoCoordinates => "no_coordinates",
            Self::NoResults => "no_results",
            Self::Status(_) => "status",
            Self::Network(_) => "network",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl fmt::Display for LookupMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input is empty"),
            Self::MissingApiKey => write!(f, "no geocoding API key configured"),
            Self::NoCoordinates => write!(f, "no coordinates found in link"),
            Self::NoResults => write!(f, "geocoder returned no results"),
            Self::Status(status) => write!(f, "geocoder returned status {status}"),
            Self::Network(msg) => write!(f, "network failure: {msg}"),
            Self::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

/// Outcome of a location lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A valid coordinate was obtained
    Found(ResolvedLocation),
    /// No coordinate; the reason is kept
    NotFound(LookupMiss),
}

impl Lookup {
    pub(crate) fn found(coordinate: GeoCoordinate, source: LocationSource) -> Self {
        Self::Found(ResolvedLocation::new(coordinate, source))
    }

    /// Whether a coordinate was obtained
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The coordinate, if found
    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        match self {
            Self::Found(location) => Some(location.coordinate),
            Self::NotFound(_) => None,
        }
    }

    /// The miss reason, if not found
    pub fn miss(&self) -> Option<&LookupMiss> {
        match self {
            Self::Found(_) => None,
            Self::NotFound(miss) => Some(miss),
        }
    }

    /// Discard the miss reason
    pub fn into_location(self) -> Option<ResolvedLocation> {
        match self {
            Self::Found(location) => Some(location),
            Self::NotFound(_) => None,
        }
    }

    /// Metric name for this outcome
    pub fn metric_name(&self) -> String {
        match self {
            Self::Found(_) => "lookup.found".to_string(),
            Self::NotFound(miss) => format!("lookup.not_found.{}", miss.reason()),
        }
    }
}

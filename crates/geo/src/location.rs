//! Location parsing for pharmacy rows from the hosted store.
//!
//! Rows do not agree on where coordinates live. Supported shapes:
//! - Flat columns: `{"lat": .., "lng": ..}` or `{"latitude": .., "longitude": ..}`
//! - A joined profile: `{"profiles": {"lat": .., "lng": ..}}` (object or one-element array)
//! - GeoJSON: `{"type": "Point", "coordinates": [lng, lat]}`
//! - WKT/EWKT strings: `POINT(lng lat)`, `SRID=4326;POINT(lng lat)`

use crate::proximity::Candidate;
use crate::{GeoCoordinate, GeoError, Result};
use serde_json::Value;

/// Column pairs checked on a row, in order.
const COLUMN_PAIRS: &[(&str, &str)] = &[("lat", "lng"), ("latitude", "longitude")];

/// Keys under which a joined record (or a nested location) may appear.
const NESTED_KEYS: &[&str] = &["profiles", "profile", "location"];

/// Parse a coordinate from a store row or location value.
///
/// Returns `None` for null, incomplete or out-of-range data; a pair of null
/// columns falls through to the next supported shape.
///
/// # Example
/// ```
/// use pharmalink_geo::parse_location;
/// use serde_json::json;
///
/// let row = json!({"id": "p1", "latitude": null, "longitude": null, "profiles": {"lat": 36.7538, "lng": 3.0588}});
/// let coord = parse_location(&row).unwrap();
/// assert_eq!(coord.latitude(), 36.7538);
///
/// let wkt = json!("POINT(3.0588 36.7538)");
/// assert_eq!(parse_location(&wkt).unwrap().longitude(), 3.0588);
/// ```
pub fn parse_location(value: &Value) -> Option<GeoCoordinate> {
    match value {
        Value::Object(map) => {
            for (lat_key, lng_key) in COLUMN_PAIRS {
                if let (Some(lat), Some(lng)) = (
                    map.get(*lat_key).and_then(as_number),
                    map.get(*lng_key).and_then(as_number),
                ) {
                    if let Some(coord) = GeoCoordinate::try_new(lat, lng) {
                        return Some(coord);
                    }
                }
            }

            if let Some(coords) = map.get("coordinates").and_then(Value::as_array) {
                if coords.len() >= 2 {
                    if let (Some(lng), Some(lat)) = (as_number(&coords[0]), as_number(&coords[1])) {
                        if let Some(coord) = GeoCoordinate::try_new(lat, lng) {
                            return Some(coord);
                        }
                    }
                }
            }

            NESTED_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(parse_location)
        }
        // A joined relation can come back as a single-element array.
        Value::Array(items) => items.first().and_then(parse_location),
        Value::String(s) => parse_wkt_point(s).ok(),
        _ => None,
    }
}

/// Build proximity candidates from store rows.
///
/// Each row needs an `id` (string or number); rows without one are skipped.
/// Rows with no usable location become unlocated candidates.
pub fn candidates_from_rows(rows: &[Value]) -> Vec<Candidate<String>> {
    rows.iter()
        .filter_map(|row| {
            let id = match row.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    tracing::debug!("Skipping row without id");
                    return None;
                }
            };
            let coordinate = parse_location(row);
            if coordinate.is_none() {
                tracing::debug!(id = %id, "Row lacks latitude/longitude");
            }
            Some(Candidate { id, coordinate })
        })
        .collect()
}

/// Parse a WKT POINT string.
///
/// Format: `POINT(longitude latitude)`, optionally prefixed with `SRID=n;`.
pub fn parse_wkt_point(wkt: &str) -> Result<GeoCoordinate> {
    let wkt = wkt.trim();
    let wkt = match wkt.split_once(';') {
        Some((srid, rest)) if srid.to_ascii_uppercase().starts_with("SRID=") => rest.trim(),
        _ => wkt,
    };

    let upper = wkt.to_ascii_uppercase();
    if !upper.starts_with("POINT(") && !upper.starts_with("POINT (") {
        return Err(GeoError::InvalidWkt(format!("Expected POINT, got: {}", wkt)));
    }

    let start = wkt.find('(').ok_or_else(|| GeoError::InvalidWkt("Missing '('".into()))?;
    let end = wkt.find(')').ok_or_else(|| GeoError::InvalidWkt("Missing ')'".into()))?;

    if start >= end {
        return Err(GeoError::InvalidWkt("Invalid parentheses".into()));
    }

    let parts: Vec<&str> = wkt[start + 1..end].split_whitespace().collect();

    if parts.len() != 2 {
        return Err(GeoError::InvalidWkt(format!(
            "Expected 2 coordinates, got {}",
            parts.len()
        )));
    }

    let lng: f64 = parts[0]
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid longitude: {}", parts[0])))?;
    let lat: f64 = parts[1]
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid latitude: {}", parts[1])))?;

    GeoCoordinate::new(lat, lng)
}

/// Numeric columns sometimes come back as strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

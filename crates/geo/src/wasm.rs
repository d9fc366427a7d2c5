//! WASM bindings for the geo crate.
//!
//! Used by the pharmacy map in the browser, where the patient's location
//! comes from the geolocation API.

use crate::{
    candidates_from_rows, centroid, extract_coordinates, haversine_distance, nearby, GeoCoordinate,
    ProximityQuery,
};
use wasm_bindgen::prelude::*;

fn coordinate(lat: f64, lng: f64) -> Result<GeoCoordinate, JsValue> {
    GeoCoordinate::new(lat, lng).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_rows(rows_json: &str) -> Result<Vec<serde_json::Value>, JsValue> {
    serde_json::from_str(rows_json).map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))
}

/// Calculate distance between two coordinates in kilometers.
#[wasm_bindgen]
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> Result<f64, JsValue> {
    let from = coordinate(lat1, lng1)?;
    let to = coordinate(lat2, lng2)?;
    Ok(haversine_distance(&from, &to))
}

/// Extract coordinates from a Google Maps link.
///
/// # Returns
/// JSON string with latitude/longitude, or `null` if the link has none
#[wasm_bindgen]
pub fn extract_link_coordinates(url: &str) -> String {
    match extract_coordinates(url) {
        Some(coord) => serde_json::json!({
            "latitude": coord.latitude(),
            "longitude": coord.longitude()
        })
        .to_string(),
        None => "null".to_string(),
    }
}

/// Pharmacies within `radius_km` of the patient, closest first.
///
/// # Arguments
/// * `origin_lat` - Patient latitude
/// * `origin_lng` - Patient longitude
/// * `radius_km` - Maximum distance in kilometers
/// * `rows_json` - JSON array of pharmacy rows with `id` and location fields
///
/// # Returns
/// JSON array of `{id, distance_km}`
#[wasm_bindgen]
pub fn nearby_pharmacies(
    origin_lat: f64,
    origin_lng: f64,
    radius_km: f64,
    rows_json: &str,
) -> Result<String, JsValue> {
    let origin = coordinate(origin_lat, origin_lng)?;
    let candidates = candidates_from_rows(&parse_rows(rows_json)?);
    let query = ProximityQuery::new(origin, radius_km, candidates)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&nearby(&query))
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}

/// Map center for a set of pharmacy rows.
///
/// # Returns
/// JSON string with latitude/longitude, or `null` if no row is located
#[wasm_bindgen]
pub fn map_center(rows_json: &str) -> Result<String, JsValue> {
    let candidates = candidates_from_rows(&parse_rows(rows_json)?);
    let located: Vec<GeoCoordinate> = candidates.iter().filter_map(|c| c.coordinate).collect();

    Ok(match centroid(&located) {
        Some(center) => serde_json::json!({
            "latitude": center.latitude(),
            "longitude": center.longitude()
        })
        .to_string(),
        None => "null".to_string(),
    })
}

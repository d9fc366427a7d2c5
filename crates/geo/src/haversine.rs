//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::GeoCoordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// Symmetric in its arguments and never fails; both inputs are already
/// validated by [`GeoCoordinate`].
///
/// # Example
/// ```
/// use pharmalink_geo::{haversine_distance, GeoCoordinate};
///
/// let algiers = GeoCoordinate::new(36.7538, 3.0588).unwrap();
/// let oran = GeoCoordinate::new(35.6971, -0.6308).unwrap();
///
/// let distance = haversine_distance(&algiers, &oran);
/// assert!((distance - 353.0).abs() < 10.0);
/// ```
#[inline]
pub fn haversine_distance(from: &GeoCoordinate, to: &GeoCoordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance_meters(from: &GeoCoordinate, to: &GeoCoordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

#[inline]
fn haversine_distance_with_radius(from: &GeoCoordinate, to: &GeoCoordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair past 1.0 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}

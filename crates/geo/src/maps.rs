//! Helpers for rendering pharmacies on a map.

use crate::GeoCoordinate;

/// Arithmetic mean of the given coordinates, used to center the pharmacy map.
///
/// Returns `None` for an empty set. Not meaningful for sets spanning the
/// antimeridian.
pub fn centroid<'a, It>(coords: It) -> Option<GeoCoordinate>
where
    It: IntoIterator<Item = &'a GeoCoordinate>,
{
    let (count, lat_sum, lng_sum) = coords
        .into_iter()
        .fold((0usize, 0.0, 0.0), |(n, lat, lng), c| {
            (n + 1, lat + c.latitude(), lng + c.longitude())
        });

    if count == 0 {
        return None;
    }

    GeoCoordinate::try_new(lat_sum / count as f64, lng_sum / count as f64)
}

/// Google Maps directions link to `destination`.
pub fn directions_url(destination: &GeoCoordinate) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        destination.latitude(),
        destination.longitude()
    )
}

/// Google Maps place link centered on `coord`; extracts back to `coord`.
pub fn place_url(coord: &GeoCoordinate, zoom: u8) -> String {
    format!(
        "https://www.google.com/maps/@{},{},{}z",
        coord.latitude(),
        coord.longitude(),
        zoom
    )
}

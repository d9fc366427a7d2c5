//! Nearby-pharmacy filtering with optional parallelism.
//!
//! The home page counts pharmacies within 50 km of the patient and the map
//! lists them closest first; both go through [`nearby`].

use crate::{haversine_distance, GeoCoordinate, GeoError, Result};
use serde::{Deserialize, Serialize};

/// Default proximity radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Reference point used when the browser cannot provide a location (Riyadh).
pub const FALLBACK_ORIGIN: GeoCoordinate = GeoCoordinate::from_trusted(24.7136, 46.6753);

/// A location-bearing record, e.g. a pharmacy row.
///
/// Rows without stored coordinates are kept as `None` and never produce a
/// result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<I> {
    /// Record ID
    pub id: I,
    /// Stored coordinate, if any
    pub coordinate: Option<GeoCoordinate>,
}

impl<I> Candidate<I> {
    /// Creates a candidate with a known coordinate.
    pub fn new(id: I, coordinate: GeoCoordinate) -> Self {
        Self { id, coordinate: Some(coordinate) }
    }

    /// Creates a candidate whose location is unknown.
    pub fn unlocated(id: I) -> Self {
        Self { id, coordinate: None }
    }
}

/// Distance from the query origin to a single candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyResult<I> {
    /// The candidate ID
    pub id: I,
    /// Great-circle distance in kilometers
    pub distance_km: f64,
}

/// A request-scoped proximity search.
#[derive(Debug, Clone)]
pub struct ProximityQuery<I> {
    origin: GeoCoordinate,
    radius_km: f64,
    candidates: Vec<Candidate<I>>,
}

impl<I> ProximityQuery<I> {
    /// Builds a query, rejecting a radius that is not finite and positive.
    pub fn new(origin: GeoCoordinate, radius_km: f64, candidates: Vec<Candidate<I>>) -> Result<Self> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(GeoError::InvalidRadius(radius_km));
        }
        Ok(Self { origin, radius_km, candidates })
    }

    /// Builds a query with [`DEFAULT_RADIUS_KM`].
    pub fn with_default_radius(origin: GeoCoordinate, candidates: Vec<Candidate<I>>) -> Self {
        Self { origin, radius_km: DEFAULT_RADIUS_KM, candidates }
    }

    /// Point distances are measured from
    pub fn origin(&self) -> &GeoCoordinate {
        &self.origin
    }

    /// Inclusive search radius
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Candidates in input order
    pub fn candidates(&self) -> &[Candidate<I>] {
        &self.candidates
    }
}

/// Calculate distances from `origin` to every located candidate.
///
/// Input order is preserved; candidates without a coordinate are skipped.
///
/// # Example
/// ```
/// use pharmalink_geo::{distances, Candidate, GeoCoordinate};
///
/// let origin = GeoCoordinate::new(36.7538, 3.0588).unwrap();
/// let candidates = vec![
///     Candidate::new("a", GeoCoordinate::new(36.7762, 3.0588).unwrap()),
///     Candidate::unlocated("b"),
/// ];
///
/// let results = distances(&origin, &candidates);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].id, "a");
/// ```
pub fn distances<I>(origin: &GeoCoordinate, candidates: &[Candidate<I>]) -> Vec<NearbyResult<I>>
where
    I: Clone + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        candidates
            .par_iter()
            .filter_map(|candidate| single_distance(origin, candidate))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        candidates
            .iter()
            .filter_map(|candidate| single_distance(origin, candidate))
            .collect()
    }
}

/// Candidates within the query radius (inclusive), closest first.
///
/// The sort is stable, so candidates at equal distance keep their input
/// order.
pub fn nearby<I>(query: &ProximityQuery<I>) -> Vec<NearbyResult<I>>
where
    I: Clone + Send + Sync,
{
    let mut results = distances(&query.origin, &query.candidates);

    results.retain(|r| r.distance_km <= query.radius_km);
    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    results
}

/// Number of candidates within `radius_km` of `origin`.
pub fn count_nearby<I>(origin: &GeoCoordinate, candidates: &[Candidate<I>], radius_km: f64) -> usize {
    candidates
        .iter()
        .filter_map(|c| c.coordinate.as_ref())
        .filter(|coord| haversine_distance(origin, coord) <= radius_km)
        .count()
}

#[inline]
fn single_distance<I: Clone>(origin: &GeoCoordinate, candidate: &Candidate<I>) -> Option<NearbyResult<I>> {
    candidate.coordinate.as_ref().map(|coord| NearbyResult {
        id: candidate.id.clone(),
        distance_km: haversine_distance(origin, coord),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALGIERS: GeoCoordinate = GeoCoordinate::from_trusted(36.7538, 3.0588);

    /// Point due north of Algiers; 0.009 degrees of latitude is ~1 km.
    fn north_of_algiers(lat_offset: f64) -> GeoCoordinate {
        GeoCoordinate::new(ALGIERS.latitude() + lat_offset, ALGIERS.longitude()).unwrap()
    }

    fn create_test_candidates() -> Vec<Candidate<&'static str>> {
        vec![
            Candidate::new("five_km", north_of_algiers(0.045)),
            Candidate::new("sixty_km", north_of_algiers(0.54)),
            Candidate::new("one_km", north_of_algiers(0.009)),
        ]
    }

    #[test]
    fn test_nearby_filters_and_sorts() {
        let query = ProximityQuery::new(ALGIERS, 50.0, create_test_candidates()).unwrap();
        let results = nearby(&query);

        let ids: Vec<_> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["one_km", "five_km"]);
        assert!((results[0].distance_km - 1.0).abs() < 0.05);
        assert!((results[1].distance_km - 5.0).abs() < 0.05);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let target = north_of_algiers(0.045);
        let exact = haversine_distance(&ALGIERS, &target);
        let query = ProximityQuery::new(ALGIERS, exact, vec![Candidate::new(1, target)]).unwrap();
        assert_eq!(nearby(&query).len(), 1);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let same = north_of_algiers(0.1);
        let candidates = vec![
            Candidate::new("first", same),
            Candidate::new("closer", north_of_algiers(0.01)),
            Candidate::new("second", same),
        ];
        let query = ProximityQuery::new(ALGIERS, 50.0, candidates).unwrap();
        let ids: Vec<_> = nearby(&query).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["closer", "first", "second"]);
    }

    #[test]
    fn test_missing_coordinates_excluded() {
        let candidates = vec![Candidate::unlocated(1), Candidate::new(2, ALGIERS), Candidate::unlocated(3)];
        let query = ProximityQuery::new(ALGIERS, 10.0, candidates).unwrap();
        let results = nearby(&query);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 2);
        assert_eq!(results[0].distance_km, 0.0);
    }

    #[test]
    fn test_empty_candidates() {
        let query: ProximityQuery<u32> = ProximityQuery::new(ALGIERS, 10.0, vec![]).unwrap();
        assert!(nearby(&query).is_empty());
    }

    #[test]
    fn test_nothing_within_radius() {
        let query = ProximityQuery::new(FALLBACK_ORIGIN, 50.0, create_test_candidates()).unwrap();
        assert!(nearby(&query).is_empty());
    }

    #[test]
    fn test_invalid_radius_rejected() {
        for radius in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = ProximityQuery::<u32>::new(ALGIERS, radius, vec![]);
            assert!(matches!(result, Err(GeoError::InvalidRadius(_))));
        }
    }

    #[test]
    fn test_distances_preserve_order() {
        let results = distances(&ALGIERS, &create_test_candidates());
        let ids: Vec<_> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["five_km", "sixty_km", "one_km"]);
    }

    #[test]
    fn test_count_nearby() {
        let mut candidates = create_test_candidates();
        candidates.push(Candidate::unlocated("nowhere"));
        assert_eq!(count_nearby(&ALGIERS, &candidates, DEFAULT_RADIUS_KM), 2);
        assert_eq!(count_nearby(&ALGIERS, &candidates, 100.0), 3);
    }

    #[test]
    fn test_default_radius_query() {
        let query = ProximityQuery::with_default_radius(ALGIERS, create_test_candidates());
        assert_eq!(query.radius_km(), DEFAULT_RADIUS_KM);
        assert_eq!(nearby(&query).len(), 2);
    }
}

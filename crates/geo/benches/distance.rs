//! Benchmarks for geo crate distance, extraction and proximity filtering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pharmalink_geo::{
    extract_coordinates, haversine_distance, nearby, parse_location, Candidate, GeoCoordinate,
    ProximityQuery,
};
use serde_json::json;

fn create_candidates(count: usize) -> Vec<Candidate<u64>> {
    (0..count)
        .map(|i| {
            // Grid of pharmacies around Algiers
            let lat = 36.0 + (i as f64 * 0.01) % 2.0;
            let lng = 2.5 + (i as f64 * 0.01) % 2.0;
            Candidate::new(i as u64, GeoCoordinate::new(lat, lng).unwrap())
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let riyadh = GeoCoordinate::new(24.7136, 46.6753).unwrap();
    let algiers = GeoCoordinate::new(36.7538, 3.0588).unwrap();

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance(black_box(&riyadh), black_box(&algiers)))
    });
}

fn bench_nearby(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearby");
    let origin = GeoCoordinate::new(36.7538, 3.0588).unwrap();

    for size in [10, 100, 1000, 10000].iter() {
        let query = ProximityQuery::new(origin, 50.0, create_candidates(*size)).unwrap();

        group.bench_with_input(BenchmarkId::new("radius_50km", size), size, |b, _| {
            b.iter(|| nearby(black_box(&query)))
        });
    }

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let place = "https://www.google.com/maps/place/Pharmacie+El+Amel/@36.7538,3.0588,17z/data=!3m1!4b1";
    let search = "https://www.google.com/maps/search/pharmacie+centrale+alger";

    let mut group = c.benchmark_group("extraction");

    group.bench_function("place_url", |b| b.iter(|| extract_coordinates(black_box(place))));
    group.bench_function("no_coordinates", |b| b.iter(|| extract_coordinates(black_box(search))));

    group.finish();
}

fn bench_row_parsing(c: &mut Criterion) {
    let flat = json!({"id": "p1", "lat": 36.7538, "lng": 3.0588});
    let joined = json!({"id": "p1", "profiles": [{"lat": 36.7538, "lng": 3.0588}]});

    let mut group = c.benchmark_group("row_parsing");

    group.bench_function("flat", |b| b.iter(|| parse_location(black_box(&flat))));
    group.bench_function("joined", |b| b.iter(|| parse_location(black_box(&joined))));

    group.finish();
}

criterion_group!(
    benches,
    bench_single_distance,
    bench_nearby,
    bench_extraction,
    bench_row_parsing
);
criterion_main!(benches);

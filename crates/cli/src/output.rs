//! Terminal output utilities
//!
//! Human-readable formatting for locations and distances. Colors are only
//! emitted when the target stream supports them.

use owo_colors::{OwoColorize, Stream};
use pharmalink_geo::{GeoCoordinate, NearbyResult};
use std::fmt::Write;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print an error message
    pub fn error(message: &str) {
        eprintln!(
            "{} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            message
        );
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!(
            "{} {}",
            "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()),
            message
        );
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!(
            "{} {}",
            "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()),
            message
        );
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print a labelled coordinate, e.g. `📍 Pharmacy: 36.753800, 3.058800`
    pub fn location(label: &str, coordinate: &GeoCoordinate) {
        println!(
            "📍 {}: {}",
            label.if_supports_color(Stream::Stdout, |t| t.bold()),
            format_coordinate(coordinate)
        );
    }
}

/// Format a distance in kilometres for display
///
/// Below one kilometre the value is shown in whole metres.
pub fn format_distance(km: f64) -> String {
    let metres = (km * 1000.0).round();
    if metres < 1000.0 {
        format!("{metres:.0} m")
    } else {
        format!("{km:.1} km")
    }
}

/// Format a coordinate as `lat, lng` with six decimals
pub fn format_coordinate(coordinate: &GeoCoordinate) -> String {
    format!("{:.6}, {:.6}", coordinate.latitude(), coordinate.longitude())
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else {
        format!("{secs:.1}s")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Render nearby results as a ranked, aligned table
pub fn nearby_table<I: std::fmt::Display>(results: &[NearbyResult<I>]) -> String {
    let ids: Vec<String> = results.iter().map(|r| r.id.to_string()).collect();
    let width = ids.iter().map(|id| id.chars().count()).max().unwrap_or(0);
    let rank_width = results.len().to_string().len();

    let mut out = String::new();
    for (rank, (id, result)) in ids.iter().zip(results).enumerate() {
        let _ = writeln!(
            out,
            "{:>rank_width$}. {:<width$}  {}",
            rank + 1,
            id,
            format_distance(result.distance_km),
        );
    }
    out
}

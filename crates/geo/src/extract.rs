//! Coordinate extraction from Google Maps links.
//!
//! Pure pattern matching over the link text. Short links carry no
//! coordinates until they are resolved; [`short_link_url`] only detects
//! them, and `pharmalink-maps` does the redirect following.
//!
//! Patterns are tried in a fixed precedence order, first valid match wins:
//!
//! 1. place style, `.../@<lat>,<lng>,15z`
//! 2. directions style, `.../dir/<lat>,<lng>`
//! 3. a bare `<lat>,<lng>` pair anywhere in the text
//!
//! An out-of-range pair does not end a pattern: its later occurrences are
//! tried before falling through to the next pattern.

use crate::GeoCoordinate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Short-link hosts that must be resolved before extraction.
pub const DEFAULT_SHORT_LINK_DOMAINS: &[&str] = &["goo.gl", "maps.app.goo.gl", "g.co", "g.page"];

/// A coordinate pattern with its two capture groups (lat, lng).
struct CoordinatePattern {
    name: &'static str,
    pattern: Regex,
}

/// Coordinate patterns in precedence order.
///
/// The place form accepts integers so that any formatted `f64` round-trips;
/// the looser forms require a decimal point to avoid matching ordinary
/// comma-separated numbers.
static PATTERNS: Lazy<Vec<CoordinatePattern>> = Lazy::new(|| {
    vec![
        CoordinatePattern {
            name: "place",
            pattern: Regex::new(r"@([-+]?\d+(?:\.\d+)?),([-+]?\d+(?:\.\d+)?)").unwrap(),
        },
        CoordinatePattern {
            name: "directions",
            pattern: Regex::new(r"/([-+]?\d+\.\d+),([-+]?\d+\.\d+)").unwrap(),
        },
        CoordinatePattern {
            name: "bare",
            pattern: Regex::new(r"([-+]?\d+\.\d+),\s*([-+]?\d+\.\d+)").unwrap(),
        },
    ]
});

/// Extract a coordinate embedded in a Google Maps URL (or any text).
///
/// Returns `None` when nothing matches; that is the normal outcome for
/// search URLs, addresses and unresolved short links.
///
/// # Example
/// ```
/// use pharmalink_geo::extract_coordinates;
///
/// let coord = extract_coordinates("https://www.google.com/maps/place/Pharmacie/@36.7538,3.0588,17z").unwrap();
/// assert_eq!(coord.latitude(), 36.7538);
/// assert_eq!(coord.longitude(), 3.0588);
///
/// assert!(extract_coordinates("https://www.google.com/maps/search/pharmacie+centrale").is_none());
/// ```
pub fn extract_coordinates(input: &str) -> Option<GeoCoordinate> {
    if input.trim().is_empty() {
        return None;
    }

    PATTERNS.iter().find_map(|p| {
        let found = p.pattern.captures_iter(input).find_map(|caps| {
            let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let lng = caps.get(2)?.as_str().parse::<f64>().ok()?;
            GeoCoordinate::try_new(lat, lng)
        });
        if found.is_some() {
            tracing::trace!(pattern = p.name, "Matched coordinate pattern");
        }
        found
    })
}

/// Returns the fetchable URL if `input` points at one of the short-link `domains`.
///
/// Scheme-less input such as `maps.app.goo.gl/abc` is accepted and
/// normalized to `https://`. A host matches a domain when it is equal to it
/// or is a subdomain of it.
pub fn short_link_url<S: AsRef<str>>(input: &str, domains: &[S]) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let (rest, has_scheme) = match lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
    {
        Some(rest) => (rest, true),
        None => (lower.as_str(), false),
    };

    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let host = host_port.split(':').next()?.trim_end_matches('.');
    if host.is_empty() {
        return None;
    }

    let matches = domains.iter().any(|d| {
        let domain = d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
        !domain.is_empty()
            && (host == domain || host.ends_with(&format!(".{domain}")))
    });

    if !matches {
        return None;
    }

    Some(if has_scheme {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    })
}

/// Returns true if `input` is a short link on one of `domains`.
#[inline]
pub fn is_short_link<S: AsRef<str>>(input: &str, domains: &[S]) -> bool {
    short_link_url(input, domains).is_some()
}

//! Location resolution workflows
//!
//! [`LocationResolver`] combines link extraction, short-link expansion and
//! geocoding, and records the outcome of every lookup in the metrics
//! registry (`lookup.found`, `lookup.not_found.<reason>`).

use crate::client::{MapsClient, Transport};
use crate::config::MapsConfig;
use crate::error::MapsResult;
use crate::geocode::GeocodingClient;
use crate::lookup::{LocationSource, Lookup, LookupMiss};
use crate::short_link::ShortLinkResolver;
use pharmalink_geo::extract_coordinates;
use pharmalink_telemetry::metrics;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Resolves pharmacy locations from map links and addresses
#[derive(Clone)]
pub struct LocationResolver {
    short_links: ShortLinkResolver,
    geocoder: GeocodingClient,
}

impl LocationResolver {
    /// Create a resolver backed by the HTTP client
    pub fn new(config: MapsConfig) -> MapsResult<Self> {
        let transport = Arc::new(MapsClient::new(&config)?);
        Ok(Self::with_transport(&config, transport))
    }

    /// Create a resolver over an arbitrary transport
    pub fn with_transport(config: &MapsConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            short_links: ShortLinkResolver::new(config, Arc::clone(&transport)),
            geocoder: GeocodingClient::new(config, transport),
        }
    }

    /// Short-link half of the resolver
    pub fn short_links(&self) -> &ShortLinkResolver {
        &self.short_links
    }

    /// Geocoding half of the resolver
    pub fn geocoder(&self) -> &GeocodingClient {
        &self.geocoder
    }

    /// Extract a coordinate from a map link, expanding short links first.
    ///
    /// A short link that cannot be resolved is not an error: extraction then
    /// runs on the link as given.
    #[instrument(skip(self))]
    pub async fn extract_from_link(&self, input: &str) -> Lookup {
        let lookup = self.extract_inner(input).await;
        record(&lookup);
        lookup
    }

    async fn extract_inner(&self, input: &str) -> Lookup {
        if input.trim().is_empty() {
            return Lookup::NotFound(LookupMiss::EmptyInput);
        }

        let (target, source) = match self.short_links.detect(input) {
            Some(url) => match self.short_links.resolve(&url).await {
                Ok(resolved) => (Cow::Owned(resolved), LocationSource::ResolvedShortLink),
                Err(e) => {
                    warn!(error = %e, url = %url, "Short link resolution failed, using link as given");
                    (Cow::Borrowed(input), LocationSource::MapLink)
                }
            },
            None => (Cow::Borrowed(input), LocationSource::MapLink),
        };

        match extract_coordinates(&target) {
            Some(coordinate) => Lookup::found(coordinate, source),
            None => Lookup::NotFound(LookupMiss::NoCoordinates),
        }
    }

    /// Geocode a free-text address
    #[instrument(skip(self))]
    pub async fn geocode_address(&self, address: &str) -> Lookup {
        let lookup = self.geocoder.geocode(address).await;
        record(&lookup);
        lookup
    }

    /// Locate a pharmacy profile from its stored map link and address
    ///
    /// The map link is tried first; the address is geocoded only when the
    /// link is absent or yields nothing. The returned miss is the one from
    /// the last step attempted.
    #[instrument(skip(self))]
    pub async fn locate_profile(&self, map_link: Option<&str>, address: Option<&str>) -> Lookup {
        if let Some(link) = map_link.filter(|l| !l.trim().is_empty()) {
            match self.extract_from_link(link).await {
                found @ Lookup::Found(_) => return found,
                Lookup::NotFound(miss) => debug!(reason = miss.reason(), "Map link gave no location"),
            }
        }

        let lookup = self.geocode_address(address.unwrap_or_default()).await;
        if let Lookup::NotFound(miss) = &lookup {
            info!(reason = miss.reason(), "Profile location unavailable");
        }
        lookup
    }
}

fn record(lookup: &Lookup) {
    metrics().increment(&lookup.metric_name());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapsError;
    use crate::testing::stalled_server;
    use async_trait::async_trait;
    use mockito::Server;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted transport: fixed redirect target and geocoder body
    struct ScriptedTransport {
        redirect_to: Option<String>,
        geocode_body: Value,
        geocode_calls: AtomicUsize,
        redirect_calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(redirect_to: Option<&str>, geocode_body: Value) -> Arc<Self> {
            Arc::new(Self {
                redirect_to: redirect_to.map(String::from),
                geocode_body,
                geocode_calls: AtomicUsize::new(0),
                redirect_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get_json(&self, _url: &str, _query: &[(&str, &str)]) -> MapsResult<Value> {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.geocode_body.clone())
        }

        async fn resolve_redirects(&self, _url: &str) -> MapsResult<String> {
            self.redirect_calls.fetch_add(1, Ordering::SeqCst);
            self.redirect_to
                .clone()
                .ok_or(MapsError::Timeout(Duration::from_secs(5)))
        }
    }

    fn oran() -> Value {
        json!({
            "status": "OK",
            "results": [{ "geometry": { "location": { "lat": 35.6971, "lng": -0.6308 } } }]
        })
    }

    fn resolver(transport: Arc<ScriptedTransport>) -> LocationResolver {
        let config = MapsConfig::default().with_api_key("test-key");
        LocationResolver::with_transport(&config, transport)
    }

    #[tokio::test]
    async fn test_full_link_needs_no_network() {
        let transport = ScriptedTransport::new(None, oran());
        let lookup = resolver(transport.clone())
            .extract_from_link("https://www.google.com/maps/place/Pharmacie/@36.7538,3.0588,15z")
            .await;

        let location = lookup.into_location().unwrap();
        assert_eq!(location.source, LocationSource::MapLink);
        assert_eq!(location.coordinate.latitude(), 36.7538);
        assert_eq!(transport.redirect_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_link_is_expanded() {
        let transport = ScriptedTransport::new(
            Some("https://www.google.com/maps/place/Pharmacie/@24.7136,46.6753,17z"),
            oran(),
        );
        let lookup = resolver(transport.clone())
            .extract_from_link("https://maps.app.goo.gl/xyz")
            .await;

        let location = lookup.into_location().unwrap();
        assert_eq!(location.source, LocationSource::ResolvedShortLink);
        assert_eq!(location.coordinate.longitude(), 46.6753);
        assert_eq!(transport.redirect_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_short_link_falls_back_to_input() {
        let transport = ScriptedTransport::new(None, oran());
        let lookup = resolver(transport)
            .extract_from_link("https://maps.app.goo.gl/xyz")
            .await;

        assert_eq!(lookup, Lookup::NotFound(LookupMiss::NoCoordinates));
    }

    #[tokio::test]
    async fn test_empty_link() {
        let transport = ScriptedTransport::new(None, oran());
        let lookup = resolver(transport).extract_from_link("  ").await;
        assert_eq!(lookup, Lookup::NotFound(LookupMiss::EmptyInput));
    }

    #[tokio::test]
    async fn test_locate_prefers_map_link() {
        let transport = ScriptedTransport::new(None, oran());
        let lookup = resolver(transport.clone())
            .locate_profile(
                Some("https://www.google.com/maps/dir//36.7538,3.0588"),
                Some("Oran"),
            )
            .await;

        assert_eq!(lookup.into_location().unwrap().source, LocationSource::MapLink);
        assert_eq!(transport.geocode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_locate_falls_back_to_address() {
        let transport = ScriptedTransport::new(None, oran());
        let lookup = resolver(transport.clone())
            .locate_profile(Some("https://www.google.com/maps/search/pharmacie"), Some("Oran"))
            .await;

        let location = lookup.into_location().unwrap();
        assert_eq!(location.source, LocationSource::Geocoded);
        assert_eq!(location.coordinate.latitude(), 35.6971);
        assert_eq!(transport.geocode_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_locate_with_nothing() {
        let transport = ScriptedTransport::new(None, oran());
        let lookup = resolver(transport.clone()).locate_profile(None, None).await;

        assert_eq!(lookup, Lookup::NotFound(LookupMiss::EmptyInput));
        assert_eq!(transport.geocode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_locate_without_key_reports_missing_key() {
        let transport = ScriptedTransport::new(None, oran());
        let resolver = LocationResolver::with_transport(&MapsConfig::default(), transport.clone());

        let lookup = resolver.locate_profile(Some(""), Some("Oran")).await;

        assert_eq!(lookup, Lookup::NotFound(LookupMiss::MissingApiKey));
        assert_eq!(transport.geocode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_outcomes_are_counted() {
        let transport = ScriptedTransport::new(None, json!({"status": "INVALID_REQUEST"}));
        let before = metrics().counter("lookup.not_found.status");

        resolver(transport).geocode_address("Oran").await;

        assert!(metrics().counter("lookup.not_found.status") > before);
    }

    #[tokio::test]
    async fn test_short_link_over_http() {
        let mut server = Server::new_async().await;
        let target = format!("{}/maps/place/Pharmacie/@36.7538,3.0588,17z", server.url());
        let _short = server
            .mock("GET", "/s/abc")
            .with_status(302)
            .with_header("location", &target)
            .create_async()
            .await;
        let _landing = server
            .mock("GET", mockito::Matcher::Regex("^/maps/place/".to_string()))
            .with_status(200)
            .create_async()
            .await;

        let config = MapsConfig::default().with_short_link_domains(["127.0.0.1"]);
        let resolver = LocationResolver::new(config).unwrap();

        let lookup = resolver
            .extract_from_link(&format!("{}/s/abc", server.url()))
            .await;

        let location = lookup.into_location().unwrap();
        assert_eq!(location.source, LocationSource::ResolvedShortLink);
        assert_eq!(location.coordinate.latitude(), 36.7538);
        assert_eq!(location.coordinate.longitude(), 3.0588);
    }

    #[tokio::test]
    async fn test_stalled_short_link_falls_back_to_link() {
        let base = stalled_server();
        let config = MapsConfig::default()
            .with_short_link_domains(["127.0.0.1"])
            .with_short_link_timeout(Duration::from_secs(1));
        let resolver = LocationResolver::new(config).unwrap();

        let start = std::time::Instant::now();
        let lookup = resolver
            .extract_from_link(&format!("{base}/maps/place/Pharmacie/@36.7,3.05,15z"))
            .await;

        assert!(start.elapsed() < Duration::from_secs(4));
        let location = lookup.into_location().unwrap();
        assert_eq!(location.source, LocationSource::MapLink);
        assert_eq!(location.coordinate.latitude(), 36.7);
        assert_eq!(location.coordinate.longitude(), 3.05);
    }

    #[tokio::test]
    async fn test_stalled_geocoder_is_network_miss() {
        let base = stalled_server();
        let config = MapsConfig::default()
            .with_api_key("test-key")
            .with_geocode_endpoint(format!("{base}/maps/api/geocode/json"))
            .with_geocode_timeout(Duration::from_secs(1));
        let resolver = LocationResolver::new(config).unwrap();

        let start = std::time::Instant::now();
        let lookup = resolver.geocode_address("Rue Didouche Mourad, Algiers").await;

        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(
            matches!(lookup, Lookup::NotFound(LookupMiss::Network(_))),
            "got {lookup:?}"
        );
    }
}

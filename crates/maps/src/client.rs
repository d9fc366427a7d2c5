//! HTTP transport
//!
//! [`Transport`] is the seam between lookup logic and the network. The
//! reqwest-backed [`MapsClient`] is the production implementation; tests
//! substitute their own.

use crate::config::MapsConfig;
use crate::error::{MapsError, MapsResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{redirect, Client, Response, Url};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Network operations needed by the resolvers
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `query` parameters and parse the body as JSON.
    ///
    /// Non-2xx responses become [`MapsError::ApiResponse`] carrying the body.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> MapsResult<Value>;

    /// Follow redirects from `url` and return the final URL.
    async fn resolve_redirects(&self, url: &str) -> MapsResult<String>;
}

/// reqwest-backed transport
///
/// Holds two clients: one for geocoding with its own timeout, and one for
/// short links with a bounded redirect policy.
#[derive(Clone)]
pub struct MapsClient {
    geocode: Client,
    redirects: Client,
    geocode_timeout: Duration,
    short_link_timeout: Duration,
    max_redirects: usize,
}

impl MapsClient {
    /// Create a client from configuration
    pub fn new(config: &MapsConfig) -> MapsResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pharmalink-maps/", env!("CARGO_PKG_VERSION"))),
        );

        let geocode = Client::builder()
            .timeout(config.geocode_timeout)
            .default_headers(default_headers.clone())
            .build()
            .map_err(MapsError::Request)?;

        let redirects = Client::builder()
            .timeout(config.short_link_timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .default_headers(default_headers)
            .build()
            .map_err(MapsError::Request)?;

        Ok(Self {
            geocode,
            redirects,
            geocode_timeout: config.geocode_timeout,
            short_link_timeout: config.short_link_timeout,
            max_redirects: config.max_redirects,
        })
    }

    fn map_send_error(&self, err: reqwest::Error, timeout: Duration) -> MapsError {
        if err.is_timeout() {
            MapsError::Timeout(timeout)
        } else if err.is_redirect() {
            MapsError::TooManyRedirects(self.max_redirects)
        } else {
            MapsError::Request(err)
        }
    }

    fn parse_url(url: &str) -> MapsResult<Url> {
        Url::parse(url).map_err(|e| MapsError::InvalidUrl(format!("{url}: {e}")))
    }

    async fn error_for_status(response: Response) -> MapsError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
        MapsError::api_response(status.as_u16(), message)
    }
}

#[async_trait]
impl Transport for MapsClient {
    // Query parameters carry the API key; keep them out of the span.
    #[instrument(skip(self, query), fields(request_id))]
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> MapsResult<Value> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());
        let url = Self::parse_url(url)?;
        let start = Instant::now();

        let response = self
            .geocode
            .get(url)
            .query(query)
            .header(X_REQUEST_ID, &request_id)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.geocode_timeout))?;

        let status = response.status();
        debug!(
            request_id = %request_id,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Geocoding response received"
        );

        if !status.is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e, self.geocode_timeout))?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip(self), fields(request_id))]
    async fn resolve_redirects(&self, url: &str) -> MapsResult<String> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());
        let url = Self::parse_url(url)?;

        let response = self
            .redirects
            .get(url)
            .header(X_REQUEST_ID, &request_id)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.short_link_timeout))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Self::error_for_status(response).await);
        }

        let final_url = response.url().to_string();
        debug!(
            request_id = %request_id,
            status = status.as_u16(),
            final_url = %final_url,
            "Short link resolved"
        );
        Ok(final_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::stalled_server;
    use mockito::{Matcher, Server};

    fn client(max_redirects: usize) -> MapsClient {
        let config = MapsConfig::default()
            .with_max_redirects(max_redirects)
            .with_short_link_timeout(Duration::from_secs(2))
            .with_geocode_timeout(Duration::from_secs(2));
        MapsClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_follows_redirects_to_final_url() {
        let mut server = Server::new_async().await;
        let target = format!("{}/maps/place/Pharmacie/@36.7538,3.0588,17z", server.url());

        let short = server
            .mock("GET", "/abc123")
            .with_status(302)
            .with_header("location", &target)
            .create_async()
            .await;
        let landing = server
            .mock("GET", Matcher::Regex("^/maps/place/".to_string()))
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let final_url = client(5)
            .resolve_redirects(&format!("{}/abc123", server.url()))
            .await
            .unwrap();

        assert_eq!(final_url, target);
        short.assert_async().await;
        landing.assert_async().await;
    }

    #[tokio::test]
    async fn test_redirect_cap_is_enforced() {
        let mut server = Server::new_async().await;
        let mut hops = Vec::new();
        for hop in 1..=4 {
            let mock = server
                .mock("GET", format!("/hop{hop}").as_str())
                .with_status(301)
                .with_header("location", &format!("{}/hop{}", server.url(), hop + 1))
                .create_async()
                .await;
            hops.push(mock);
        }

        let err = client(2)
            .resolve_redirects(&format!("{}/hop1", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, MapsError::TooManyRedirects(2)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unparseable_url_is_rejected() {
        let err = client(5).resolve_redirects("http://").await.unwrap_err();
        assert!(matches!(err, MapsError::InvalidUrl(_)), "got {err:?}");

        let err = client(5).get_json("not a url", &[]).await.unwrap_err();
        assert!(matches!(err, MapsError::InvalidUrl(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_stalled_short_link_times_out() {
        let base = stalled_server();
        let config = MapsConfig::default().with_short_link_timeout(Duration::from_secs(1));
        let client = MapsClient::new(&config).unwrap();

        let start = Instant::now();
        let err = client.resolve_redirects(&format!("{base}/s/abc")).await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, MapsError::Timeout(t) if t == Duration::from_secs(1)), "got {err:?}");
        assert!(err.is_timeout());
        assert!(elapsed >= Duration::from_millis(900), "returned after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "returned after {elapsed:?}");
    }

    #[tokio::test]
    async fn test_stalled_geocoder_times_out() {
        let base = stalled_server();
        let config = MapsConfig::default().with_geocode_timeout(Duration::from_secs(1));
        let client = MapsClient::new(&config).unwrap();

        let start = Instant::now();
        let err = client
            .get_json(&format!("{base}/maps/api/geocode/json"), &[("address", "Oran")])
            .await
            .unwrap_err();

        assert!(matches!(err, MapsError::Timeout(_)), "got {err:?}");
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_final_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .with_body("not here")
            .create_async()
            .await;

        let err = client(5)
            .resolve_redirects(&format!("{}/gone", server.url()))
            .await
            .unwrap_err();

        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_get_json_sends_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/geocode/json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("address".into(), "Bab Ezzouar".into()),
                Matcher::UrlEncoded("key".into(), "k".into()),
            ]))
            .match_header("x-request-id", Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"OK","results":[]}"#)
            .create_async()
            .await;

        let body = client(5)
            .get_json(
                &format!("{}/geocode/json", server.url()),
                &[("address", "Bab Ezzouar"), ("key", "k")],
            )
            .await
            .unwrap();

        assert_eq!(body["status"], "OK");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_json_error_status_keeps_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/geocode/json")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = client(5)
            .get_json(&format!("{}/geocode/json", server.url()), &[])
            .await
            .unwrap_err();

        match err {
            MapsError::ApiResponse { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_json_rejects_non_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/geocode/json")
            .with_status(200)
            .with_body("<html>captcha</html>")
            .create_async()
            .await;

        let err = client(5)
            .get_json(&format!("{}/geocode/json", server.url()), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, MapsError::Json(_)));
    }
}

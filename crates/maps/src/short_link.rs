//! Short-link resolution

use crate::client::Transport;
use crate::config::MapsConfig;
use crate::error::MapsResult;
use pharmalink_geo::short_link_url;
use pharmalink_telemetry::Timer;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Expands map short links (`maps.app.goo.gl/...`) to their full URL
#[derive(Clone)]
pub struct ShortLinkResolver {
    transport: Arc<dyn Transport>,
    domains: Vec<String>,
}

impl ShortLinkResolver {
    /// Resolver for the configured short-link hosts
    pub fn new(config: &MapsConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            domains: config.short_link_domains.clone(),
        }
    }

    /// Configured short-link hosts
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Normalized URL if `input` is a short link on a configured host
    pub fn detect(&self, input: &str) -> Option<String> {
        short_link_url(input, &self.domains)
    }

    /// Follow the redirect chain of `url` and return where it lands.
    #[instrument(skip(self))]
    pub async fn resolve(&self, url: &str) -> MapsResult<String> {
        let _timer = Timer::start("short_link.latency_ms");
        let resolved = self.transport.resolve_redirects(url).await?;
        debug!(resolved = %resolved, "Expanded short link");
        Ok(resolved)
    }
}

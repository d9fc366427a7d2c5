//! Network-backed location lookups for PharmaLink
//!
//! This crate resolves pharmacy coordinates that cannot be read straight
//! out of a map link:
//!
//! - **Short links**: `maps.app.goo.gl` style links are expanded by following
//!   redirects (bounded count and timeout) before extraction
//! - **Geocoding**: free-text addresses go to the Google Geocoding API
//! - **Profile workflow**: map link first, address second
//!
//! Lookups never fail with an error. Each returns a [`Lookup`] that is either
//! a [`ResolvedLocation`] or a [`LookupMiss`] naming the reason.
//!
//! # Example
//!
//! ```rust,no_run
//! use pharmalink_maps::{LocationResolver, MapsConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = LocationResolver::new(MapsConfig::from_env()?)?;
//!
//!     let lookup = resolver
//!         .locate_profile(Some("https://maps.app.goo.gl/abc"), Some("Rue Didouche Mourad, Alger"))
//!         .await;
//!
//!     match lookup.into_location() {
//!         Some(location) => println!("{} ({})", location.coordinate, location.source),
//!         None => println!("location unavailable"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod geocode;
pub mod lookup;
pub mod resolver;
pub mod short_link;

#[cfg(test)]
mod testing;

pub use client::{MapsClient, Transport};
pub use config::{MapsConfig, DEFAULT_GEOCODE_ENDPOINT};
pub use error::{MapsError, MapsResult};
pub use geocode::GeocodingClient;
pub use lookup::{LocationSource, Lookup, LookupMiss, ResolvedLocation};
pub use resolver::LocationResolver;
pub use short_link::ShortLinkResolver;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::MapsConfig;
    pub use crate::error::{MapsError, MapsResult};
    pub use crate::lookup::{LocationSource, Lookup, LookupMiss, ResolvedLocation};
    pub use crate::resolver::LocationResolver;
}

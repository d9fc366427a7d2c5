//! Configuration loading and schema definitions
//!
//! `pharmalink.toml` plus environment overrides for the API key and
//! geocoding endpoint.

mod loader;
mod schema;

pub use loader::{Config, API_KEY_VAR, ENDPOINT_VAR, PUBLIC_API_KEY_VAR, TIMEOUT_VAR};
pub use schema::*;

//! Core utilities for the PharmaLink location toolkit
//!
//! This crate provides shared functionality used by the geo, maps and CLI crates:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with environment overrides and validation
//!
//! # Example
//!
//! ```rust,no_run
//! use pharmalink_core::config::Config;
//!
//! let config = Config::load(None).expect("valid configuration");
//! if config.schema.geocoding.api_key.is_none() {
//!     eprintln!("Geocoding disabled: no API key configured");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
}

//! Terminal helpers for PharmaLink command-line tools
//!
//! Provides shared CLI functionality:
//! - Status messages and location/distance formatting
//! - Spinners for pending network lookups

#![warn(missing_docs)]

pub mod output;
pub mod progress;

pub use output::{format_coordinate, format_distance, nearby_table, Status};
pub use progress::spinner;

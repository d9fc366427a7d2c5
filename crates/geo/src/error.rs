//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
///
/// Extraction and row parsing never surface these; they report "no result"
/// as `None`. Errors only come from explicit constructors.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Latitude or longitude out of range, NaN or infinite
    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate {
        /// Rejected latitude
        latitude: f64,
        /// Rejected longitude
        longitude: f64,
    },

    /// Invalid WKT format
    #[error("Invalid WKT format: {0}")]
    InvalidWkt(String),

    /// Proximity radius must be finite and positive
    #[error("Invalid radius: {0} km (must be finite and > 0)")]
    InvalidRadius(f64),
}

/// Error code for integration with pharmalink-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid coordinate values
    InvalidCoordinate = 10001,
    /// Invalid WKT format
    InvalidWkt = 10002,
    /// Invalid proximity radius
    InvalidRadius = 10003,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidCoordinate { .. } => GeoErrorCode::InvalidCoordinate,
            GeoError::InvalidWkt(_) => GeoErrorCode::InvalidWkt,
            GeoError::InvalidRadius(_) => GeoErrorCode::InvalidRadius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GeoError::InvalidRadius(0.0).code() as u32, 10003);
        let err = GeoError::InvalidCoordinate { latitude: 91.0, longitude: 0.0 };
        assert_eq!(err.code(), GeoErrorCode::InvalidCoordinate);
        assert!(err.to_string().contains("91"));
    }
}

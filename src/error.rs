//! Error types for geoframe

use std::io;

use thiserror::Error;

/// Result type for geoframe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting coordinates
#[derive(Debug, Error)]
pub enum Error {
    /// Zone outside the configured band on an inverse transform
    #[error("Invalid UTM zone {zone}: supported zones are {min}-{max}")]
    InvalidZone { zone: u8, min: u8, max: u8 },

    /// Local frame conversion requested without a project origin
    #[error("Missing project origin")]
    MissingOrigin,

    /// Numerical failure in the projection math or invalid numeric input
    #[error("Transform failed: {0}")]
    TransformFailure(String),

    /// Malformed import data
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decoding error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn transform(msg: impl Into<String>) -> Self {
        Error::TransformFailure(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TransformFailure("latitude is NaN".to_string());
        assert_eq!(err.to_string(), "Transform failed: latitude is NaN");
    }

    #[test]
    fn test_invalid_zone_display() {
        let err = Error::InvalidZone { zone: 33, min: 28, max: 31 };
        assert!(err.to_string().contains("33"));
        assert!(err.to_string().contains("28-31"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_missing_origin() {
        assert_eq!(Error::MissingOrigin.to_string(), "Missing project origin");
    }
}

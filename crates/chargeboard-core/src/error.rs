//! Error types for chargeboard
//!
//! This module defines the error type used throughout the chargeboard
//! crates. All errors are derived from `thiserror` for convenient error
//! handling and automatic `From` implementations.
//!
//! Malformed payload records are never errors: the normalizer substitutes
//! defaults or drops the row. Errors are reserved for I/O, transport, and
//! the one fatal condition of a run, having no usable data at all.
//!
//! # Example
//!
//! ```
//! use chargeboard_core::error::{ChargeboardError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to ChargeboardError
//!     let _file = std::fs::read_to_string("nonexistent.json")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for chargeboard operations
#[derive(Error, Debug)]
pub enum ChargeboardError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The vendor API answered with a non-success status
    #[error("API error: {endpoint} returned HTTP {status}")]
    Api {
        /// Endpoint that failed
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Missing or rejected access token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The account has no vehicles
    #[error("No vehicles found on this account")]
    NoVehicle,

    /// Neither table has any rows
    #[error("No usable data in either the daily history or the session history")]
    NoUsableData,

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chart rendering failed
    #[error("Render error: {0}")]
    Render(String),
}

/// Convenience type alias for Results in chargeboard
pub type Result<T> = std::result::Result<T, ChargeboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ChargeboardError::NoUsableData;
        assert_eq!(
            error.to_string(),
            "No usable data in either the daily history or the session history"
        );

        let error = ChargeboardError::Api {
            endpoint: "/api/1/vehicles".to_string(),
            status: 401,
        };
        assert_eq!(error.to_string(), "API error: /api/1/vehicles returned HTTP 401");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ChargeboardError = io_error.into();
        assert!(matches!(error, ChargeboardError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: ChargeboardError = json_error.into();
        assert!(matches!(error, ChargeboardError::Json(_)));
    }
}

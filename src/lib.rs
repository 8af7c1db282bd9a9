//! GeoNorge Fetcher Library
//!
//! A Rust library for ordering and downloading datasets from the
//! GeoNorge national geodata download service. Handles GeoID bearer
//! tokens, saved credentials, catalog search, and order placement.

pub mod app;
pub mod auth;
pub mod cli;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessible() {
        // Test that our constants are accessible
        assert_eq!(constants::env::USERNAME, "GEONORGE_USERNAME");
        assert_eq!(constants::auth::CLIENT_ID, "geonorge_kartkatalog");
        assert!(constants::http::USER_AGENT.contains("geonorge_fetcher"));
    }

    #[test]
    fn test_error_types() {
        // Test that our error types work correctly
        let config_error = errors::ConfigError::MissingCredentials;
        let app_error = AppError::Config(config_error);

        assert_eq!(app_error.category(), "config");
        assert!(!app_error.is_unauthorized());
    }
}

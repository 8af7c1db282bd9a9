//! Error types for the GeoNorge fetcher
//!
//! This module defines error types for all components of the application.
//! Errors are designed to be actionable and provide clear context for
//! debugging and user feedback.

use thiserror::Error;

/// Configuration and argument errors
///
/// Always fatal, never mutate the on-disk caches.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Credentials are required but could not be resolved from any source
    #[error(
        "Missing credentials. Provide --username/--password (or GEONORGE_USERNAME/GEONORGE_PASSWORD) to continue"
    )]
    MissingCredentials,

    /// Only one half of a username/password pair was supplied
    #[error("{provided} was provided but {missing} is missing. Set both or neither")]
    IncompleteCredentialPair {
        provided: &'static str,
        missing: &'static str,
    },

    /// No bearer token could be resolved by any source
    #[error(
        "No bearer token available. Provide --token, set GEONORGE_BEARER_TOKEN, or supply credentials to acquire one"
    )]
    TokenUnavailable,

    /// A required prompt value was left empty
    #[error("{label} is required")]
    RequiredValue { label: String },

    /// Interactive input was needed but stdin is not a terminal
    #[error(
        "Interactive prompt is not available (stdin is redirected). Supply the value via flags or environment variables"
    )]
    PromptUnavailable,

    /// The service offered no selectable options for a required choice
    #[error("No {what} available for the selected dataset/area")]
    NoOptions { what: &'static str },
}

/// Authentication and token acquisition errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity provider rejected the password grant or returned an
    /// unusable response; the raw body is kept for diagnosis
    #[error("Failed to acquire bearer token from GeoID: {body}")]
    TokenAcquisition { body: String },

    /// HTTP transport failure while talking to the identity provider
    #[error("HTTP request failed during authentication")]
    Http(#[from] reqwest::Error),

    /// I/O failure while prompting for credentials
    #[error("Failed to read credentials from the terminal")]
    Prompt(#[from] std::io::Error),
}

/// Download service and catalog API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service answered with a non-success status code
    #[error("GeoNorge API request failed with {status} {reason}: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    /// HTTP transport failure
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The response body could not be parsed as the expected JSON shape
    #[error("Failed to parse API response")]
    Decode(#[from] serde_json::Error),

    /// A download URL returned by the service could not be parsed
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl ApiError {
    /// Whether this error is a 401 from the service
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// File download errors during the per-file download phase
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The service rejected or failed the download request
    #[error(transparent)]
    Api(#[from] ApiError),

    /// File I/O failure while streaming to disk
    #[error("File I/O error")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Whether the underlying cause is a 401 from the service.
    ///
    /// Drives the cache-clearing remediation path for auth-relevant
    /// commands.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            AppError::Api(api) => api.is_unauthorized(),
            AppError::Download(DownloadError::Api(api)) => api.is_unauthorized(),
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Auth(_) => "authentication",
            AppError::Api(_) => "api",
            AppError::Download(_) => "download",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> ApiError {
        ApiError::Status {
            status,
            reason: "Unauthorized".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn unauthorized_detected_through_wrappers() {
        let app: AppError = status_error(401).into();
        assert!(app.is_unauthorized());

        let wrapped: AppError = DownloadError::Api(status_error(401)).into();
        assert!(wrapped.is_unauthorized());
    }

    #[test]
    fn other_statuses_are_not_unauthorized() {
        let app: AppError = status_error(403).into();
        assert!(!app.is_unauthorized());

        let config: AppError = ConfigError::TokenUnavailable.into();
        assert!(!config.is_unauthorized());
    }

    #[test]
    fn categories() {
        let app: AppError = ConfigError::MissingCredentials.into();
        assert_eq!(app.category(), "config");

        let app: AppError = AuthError::TokenAcquisition {
            body: "{}".to_string(),
        }
        .into();
        assert_eq!(app.category(), "authentication");
    }
}

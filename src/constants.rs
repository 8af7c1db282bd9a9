//! Application constants for the GeoNorge fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names recognized at startup
pub mod env {
    /// Environment variable name for the GeoNorge username
    pub const USERNAME: &str = "GEONORGE_USERNAME";

    /// Environment variable name for the GeoNorge password
    pub const PASSWORD: &str = "GEONORGE_PASSWORD";

    /// Environment variable name for a pre-acquired bearer token
    pub const BEARER_TOKEN: &str = "GEONORGE_BEARER_TOKEN";

    /// Environment variable name for the download service base URL
    pub const BASE_URL: &str = "GEONORGE_BASE_URL";
}

/// Identity provider (GeoID) constants for bearer token acquisition
pub mod auth {
    use super::Duration;

    /// GeoID OpenID Connect token endpoint
    pub const TOKEN_ENDPOINT: &str =
        "https://auth2.geoid.no/realms/geoid/protocol/openid-connect/token";

    /// Fixed OAuth client id used for the password grant
    pub const CLIENT_ID: &str = "geonorge_kartkatalog";

    /// Fixed OAuth scope used for the password grant
    pub const SCOPE: &str = "openid email profile";

    /// Fallback token lifetime when the response omits `expires_in`
    pub const DEFAULT_EXPIRES_IN_SECS: i64 = 300;

    /// Safety margin subtracted from the stored expiry before reuse.
    /// A cached token expiring within this window is treated as absent.
    pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "geonorge_fetcher/0.1.0";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
}

/// GeoNorge service URLs and endpoints
pub mod services {
    /// Default download service base URL
    pub const DOWNLOAD_BASE_URL: &str = "https://nedlasting.geonorge.no";

    /// Kartkatalog free-text dataset search endpoint
    pub const CATALOG_SEARCH_URL: &str = "https://kartkatalog.geonorge.no/api/search";

    /// Codelist resource for usage groups
    pub const USAGE_GROUP_CODELIST_URL: &str =
        "https://register.geonorge.no/api/metadata-kodelister/brukergrupper.json";

    /// Codelist resource for usage purposes
    pub const USAGE_PURPOSE_CODELIST_URL: &str =
        "https://register.geonorge.no/api/metadata-kodelister/formal.json";

    /// Default URL template host for basic-auth testing
    pub const AUTH_TEST_BASE_URL: &str = "https://httpbin.org/basic-auth";

    /// Page size for catalog searches
    pub const CATALOG_SEARCH_PAGE_SIZE: usize = 25;
}

/// On-disk cache file locations
pub mod files {
    /// Application directory name under the platform config directory
    pub const APP_DIR_NAME: &str = "geonorge_fetcher";

    /// Persisted credentials file name
    pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

    /// Persisted bearer token file name
    pub const BEARER_TOKEN_FILE_NAME: &str = "bearer-token.json";
}

/// Built-in order defaults used when neither flags nor interactive
/// selection override them
pub mod defaults {
    /// Default dataset metadata UUID (FKB-Arealbruk)
    pub const METADATA_UUID: &str = "8b4304ea-4fb0-479c-a24d-fa225e2c6e97";

    /// Default area code (Horten municipality)
    pub const AREA_CODE: &str = "3901";

    /// Default area name
    pub const AREA_NAME: &str = "Horten";

    /// Default area type
    pub const AREA_TYPE: &str = "kommune";

    /// Default projection code (EUREF89 UTM 32 + NN2000)
    pub const PROJECTION_CODE: &str = "5972";

    /// Default projection name
    pub const PROJECTION_NAME: &str = "EUREF89 UTM sone 32, 2d + NN2000";

    /// Default projection codespace
    pub const PROJECTION_CODESPACE: &str = "http://www.opengis.net/def/crs/EPSG/0/5972";

    /// Default format name
    pub const FORMAT_NAME: &str = "GML";

    /// Default usage group
    pub const USAGE_GROUP: &str = "næringsliv";

    /// Default usage purpose
    pub const USAGE_PURPOSE: &str = "tekoginnovasjon";

    /// Default software client identity reported on orders
    pub const SOFTWARE_CLIENT: &str = "Kartkatalogen";

    /// Default software client version reported on orders
    pub const SOFTWARE_CLIENT_VERSION: &str = "15.7.2821";

    /// Default output directory (relative to the working directory)
    pub const OUTPUT_DIR: &str = "downloads";

    /// Default search text offered in interactive dataset selection
    pub const SEARCH_QUERY: &str = "FKB";
}

// Re-export commonly used constants for convenience
pub use auth::{EXPIRY_MARGIN, TOKEN_ENDPOINT};
pub use env::{
    BASE_URL as ENV_BASE_URL, BEARER_TOKEN as ENV_BEARER_TOKEN, PASSWORD as ENV_PASSWORD,
    USERNAME as ENV_USERNAME,
};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use services::DOWNLOAD_BASE_URL;

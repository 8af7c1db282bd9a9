//! HTTP client for the GeoNorge download service
//!
//! Thin typed wrapper over reqwest: GET/POST helpers that surface non-2xx
//! responses as `ApiError` with the raw body preserved, plus a streaming
//! download. Plain endpoints attach basic auth when credentials are
//! available; the bearer-authenticated twins attach `Authorization:
//! Bearer` per request. Every call is attempted exactly once.

use std::path::Path;

use futures::StreamExt;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::models::{
    AreaOption, CanDownloadRequest, CanDownloadResponse, CapabilitiesResponse, FormatOption,
    OrderRequest, OrderResponse, ProjectionOption,
};
use crate::auth::StoredCredentials;
use crate::constants::http;
use crate::errors::{ApiError, ApiResult, AppError, DownloadResult, Result};

/// Decode a response body after the status check.
///
/// Non-success statuses carry the status, reason phrase, and raw body.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResult<T> {
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}

/// Typed client for one download-service base URL
#[derive(Debug, Clone)]
pub struct GeonorgeClient {
    client: Client,
    base_url: Url,
    basic_auth: Option<StoredCredentials>,
}

impl GeonorgeClient {
    /// Create a client for the given base URL.
    ///
    /// Basic auth, when supplied, is attached to the plain (non-bearer)
    /// endpoints only.
    pub fn new(base_url: &str, basic_auth: Option<StoredCredentials>) -> Result<Self> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|_| AppError::generic(format!("Invalid base URL: {}", base_url)))?;

        let client = Client::builder()
            .timeout(http::DEFAULT_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .user_agent(http::USER_AGENT)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            client,
            base_url,
            basic_auth,
        })
    }

    /// The base URL this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url.join(path).map_err(|_| ApiError::InvalidUrl {
            url: format!("{}{}", self.base_url, path),
        })
    }

    /// Resolve an absolute or base-relative URL
    fn resolve_url(&self, url: &str) -> ApiResult<Url> {
        Url::parse(url)
            .or_else(|_| self.base_url.join(url))
            .map_err(|_| ApiError::InvalidUrl {
                url: url.to_string(),
            })
    }

    /// Bearer wins over basic; unauthenticated otherwise
    fn authorize(&self, request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        match (bearer, &self.basic_auth) {
            (Some(token), _) => request.bearer_auth(token),
            (None, Some(credentials)) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            }
            (None, None) => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, bearer: Option<&str>) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        let response = self.authorize(self.client.get(url), bearer).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_body(status, &body)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        request_body: &B,
        bearer: Option<&str>,
    ) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        let response = self
            .authorize(self.client.post(url).json(request_body), bearer)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        decode_body(status, &body)
    }

    /// Capabilities for one dataset
    pub async fn get_capabilities(&self, metadata_uuid: &str) -> ApiResult<CapabilitiesResponse> {
        self.get_json(&format!("api/capabilities/{}", metadata_uuid), None)
            .await
    }

    /// Dataset-wide area list (plain endpoint)
    pub async fn get_areas(&self, metadata_uuid: &str) -> ApiResult<Vec<AreaOption>> {
        self.get_json(&format!("api/v2/codelists/area/{}", metadata_uuid), None)
            .await
    }

    /// Dataset-wide projection list (plain endpoint)
    pub async fn get_projections(&self, metadata_uuid: &str) -> ApiResult<Vec<ProjectionOption>> {
        self.get_json(
            &format!("api/v2/codelists/projection/{}", metadata_uuid),
            None,
        )
        .await
    }

    /// Dataset-wide format list (plain endpoint)
    pub async fn get_formats(&self, metadata_uuid: &str) -> ApiResult<Vec<FormatOption>> {
        self.get_json(&format!("api/v2/codelists/format/{}", metadata_uuid), None)
            .await
    }

    /// Dataset-wide area list via the bearer-authenticated path
    pub async fn get_areas_authorized(
        &self,
        metadata_uuid: &str,
        token: &str,
    ) -> ApiResult<Vec<AreaOption>> {
        self.get_json(&format!("api/codelists/area/{}", metadata_uuid), Some(token))
            .await
    }

    /// Dataset-wide projection list via the bearer-authenticated path
    pub async fn get_projections_authorized(
        &self,
        metadata_uuid: &str,
        token: &str,
    ) -> ApiResult<Vec<ProjectionOption>> {
        self.get_json(
            &format!("api/codelists/projection/{}", metadata_uuid),
            Some(token),
        )
        .await
    }

    /// Dataset-wide format list via the bearer-authenticated path
    pub async fn get_formats_authorized(
        &self,
        metadata_uuid: &str,
        token: &str,
    ) -> ApiResult<Vec<FormatOption>> {
        self.get_json(
            &format!("api/codelists/format/{}", metadata_uuid),
            Some(token),
        )
        .await
    }

    /// Pre-flight polygon download check
    pub async fn can_download(&self, request: &CanDownloadRequest) -> ApiResult<CanDownloadResponse> {
        self.post_json("api/v2/can-download", request, None).await
    }

    /// Create an order on the plain endpoint
    pub async fn create_order(&self, request: &OrderRequest) -> ApiResult<OrderResponse> {
        self.post_json("api/v2/order", request, None).await
    }

    /// Create an order on the bearer-authenticated endpoint
    pub async fn create_order_authorized(
        &self,
        request: &OrderRequest,
        token: &str,
    ) -> ApiResult<OrderResponse> {
        self.post_json("api/order", request, Some(token)).await
    }

    /// Fetch an order by reference number on the plain endpoint
    pub async fn get_order(&self, reference_number: &str) -> ApiResult<OrderResponse> {
        self.get_json(&format!("api/v2/order/{}", reference_number), None)
            .await
    }

    /// Fetch an order by reference number on the bearer-authenticated
    /// endpoint
    pub async fn get_order_authorized(
        &self,
        reference_number: &str,
        token: &str,
    ) -> ApiResult<OrderResponse> {
        self.get_json(&format!("api/order/{}", reference_number), Some(token))
            .await
    }

    /// Download one order file by id to `destination` (plain endpoint)
    pub async fn download_order_file(
        &self,
        reference_number: &str,
        file_id: &str,
        destination: &Path,
    ) -> DownloadResult<()> {
        let path = format!("api/v2/download/order/{}/{}", reference_number, file_id);
        self.download_from_url(&path, destination, None).await
    }

    /// Stream an absolute or base-relative URL to `destination`.
    ///
    /// Parent directories are created; the body is streamed chunk by
    /// chunk rather than buffered.
    pub async fn download_from_url(
        &self,
        url: &str,
        destination: &Path,
        bearer: Option<&str>,
    ) -> DownloadResult<()> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let target = self.resolve_url(url)?;
        let response = self
            .authorize(self.client.get(target), bearer)
            .send()
            .await
            .map_err(ApiError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(ApiError::Http)?;
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            }
            .into());
        }

        let mut file = tokio::fs::File::create(destination).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ApiError::Http)?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!("Downloaded {}", destination.display());
        Ok(())
    }
}

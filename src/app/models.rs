//! Wire types for the GeoNorge download service
//!
//! Field names follow the service's camelCase JSON. Options embed their
//! own projection/format subsets where the service provides them; an
//! area's nested lists take precedence over the dataset-wide lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A hypermedia link attached to capability responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLink {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub rel: String,
    #[serde(default, rename = "templatedSpecified")]
    pub templated_specified: bool,
}

/// What selections the service supports for one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesResponse {
    #[serde(default)]
    pub supports_projection_selection: bool,
    #[serde(default)]
    pub supports_format_selection: bool,
    #[serde(default)]
    pub supports_polygon_selection: bool,
    #[serde(default)]
    pub supports_area_selection: bool,
    #[serde(default)]
    pub map_selection_layer: Option<String>,
    #[serde(default, rename = "_links")]
    pub links: Vec<ApiLink>,
}

/// A coordinate reference system choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOption {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub codespace: Option<String>,
}

/// An output file-format choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOption {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projections: Option<Vec<ProjectionOption>>,
}

/// A selectable geographic extent.
///
/// Nested projections/formats, when non-empty, are the valid subsets for
/// this area and win over the dataset-wide lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaOption {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub projections: Vec<ProjectionOption>,
    #[serde(default)]
    pub formats: Vec<FormatOption>,
}

/// Pre-flight check request for polygon downloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanDownloadRequest {
    pub metadata_uuid: String,
    pub coordinates: String,
    pub coordinate_system: String,
}

/// Pre-flight check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanDownloadResponse {
    #[serde(default)]
    pub can_download: bool,
}

/// The area chosen on an order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSelection {
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
}

/// One dataset line within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub metadata_uuid: String,
    #[serde(default)]
    pub areas: Vec<AreaSelection>,
    #[serde(default)]
    pub projections: Vec<ProjectionOption>,
    #[serde(default)]
    pub formats: Vec<FormatOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_purpose: Option<Vec<String>>,
}

/// An order submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_client_version: Option<String>,
    #[serde(default)]
    pub order_lines: Vec<OrderLineRequest>,
}

/// One file produced by an order.
///
/// Only status `ReadyForDownload` (case-insensitive) with a non-empty
/// `downloadUrl` is downloadable; anything else is a soft skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFile {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub metadata_uuid: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub area_name: Option<String>,
    #[serde(default)]
    pub projection: Option<String>,
    #[serde(default)]
    pub projection_name: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata_name: Option<String>,
    #[serde(default)]
    pub coordinates: Option<String>,
}

/// A created or fetched order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(default)]
    pub reference_number: String,
    #[serde(default)]
    pub files: Vec<OrderFile>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

/// A dataset hit from the Kartkatalog free-text search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetHit {
    pub uuid: String,
    pub title: String,
    pub organization: String,
}

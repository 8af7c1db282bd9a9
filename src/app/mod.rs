//! Core application logic for the GeoNorge Fetcher
//!
//! Contains the HTTP client for the download service, the catalog and
//! codelist client, the wire models, and the order-download workflow.

pub mod catalog;
pub mod client;
pub mod models;
pub mod order;

pub use catalog::{CatalogClient, CodelistEntry};
pub use client::GeonorgeClient;
pub use models::{
    AreaOption, CanDownloadRequest, CanDownloadResponse, CapabilitiesResponse, DatasetHit,
    FormatOption, OrderFile, OrderRequest, OrderResponse, ProjectionOption,
};
pub use order::{DownloadReport, FileDisposition, OrderDownloadOptions, OrderFilesStep};

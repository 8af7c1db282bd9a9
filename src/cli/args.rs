//! Command-line argument parsing for GeoNorge Fetcher
//!
//! This module defines the CLI structure using clap derive macros,
//! covering the order-and-download workflow plus direct access to the
//! individual download-API endpoints.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// GeoNorge Fetcher - Order and download Norwegian geodata
#[derive(Parser, Debug)]
#[command(
    name = "geonorge_fetcher",
    version,
    about = "Order and download datasets from the GeoNorge download service",
    long_about = "A client for the GeoNorge national geodata download service.
Places dataset orders, manages GeoID bearer tokens and saved credentials,
and exposes the individual download-API endpoints for scripting."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// GeoNorge username (falls back to GEONORGE_USERNAME)
    #[arg(short = 'u', long, global = true)]
    pub username: Option<String>,

    /// GeoNorge password (falls back to GEONORGE_PASSWORD)
    #[arg(short = 'p', long, global = true)]
    pub password: Option<String>,

    /// Download-API base URL (falls back to GEONORGE_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Order a dataset and download its files
    OrderDownload(OrderDownloadArgs),

    /// Show download capabilities for a dataset
    Capabilities(DatasetArgs),

    /// List selectable areas for a dataset
    Areas(DatasetArgs),

    /// List selectable projections for a dataset
    Projections(DatasetArgs),

    /// List selectable formats for a dataset
    Formats(DatasetArgs),

    /// Check whether a polygon selection can be downloaded
    CanDownload(CanDownloadArgs),

    /// Submit an order request from a JSON file
    OrderCreate(OrderCreateArgs),

    /// Fetch an existing order by reference number
    OrderGet(OrderGetArgs),

    /// Download a single file from an order
    DownloadFile(DownloadFileArgs),

    /// Verify credentials against an authenticated endpoint
    AuthTest(AuthTestArgs),
}

/// Arguments for the order-download workflow
#[derive(Args, Debug, Clone)]
pub struct OrderDownloadArgs {
    /// Ask for dataset, area, projection, format and usage interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Bearer token to use instead of acquiring one
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Metadata UUID of the dataset to order
    #[arg(long, value_name = "UUID")]
    pub metadata_uuid: Option<String>,

    /// Area code (e.g. a municipality number)
    #[arg(long)]
    pub area_code: Option<String>,

    /// Area display name
    #[arg(long)]
    pub area_name: Option<String>,

    /// Area type (e.g. "kommune", "fylke", "landsdekkende")
    #[arg(long)]
    pub area_type: Option<String>,

    /// Projection EPSG code
    #[arg(long)]
    pub projection_code: Option<String>,

    /// Projection display name
    #[arg(long)]
    pub projection_name: Option<String>,

    /// Projection codespace URI
    #[arg(long)]
    pub projection_codespace: Option<String>,

    /// Format code
    #[arg(long)]
    pub format_code: Option<String>,

    /// Format name (e.g. "GML", "SOSI")
    #[arg(long)]
    pub format_name: Option<String>,

    /// Format type
    #[arg(long)]
    pub format_type: Option<String>,

    /// User group reported with the order
    #[arg(long)]
    pub usage_group: Option<String>,

    /// Purpose reported with the order
    #[arg(long)]
    pub usage_purpose: Option<String>,

    /// Software client name reported with the order
    #[arg(long)]
    pub software_client: Option<String>,

    /// Software client version reported with the order
    #[arg(long)]
    pub software_client_version: Option<String>,

    /// Email address for order notifications
    #[arg(long)]
    pub email: Option<String>,

    /// Directory to download files into
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for endpoints keyed by dataset UUID
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Metadata UUID of the dataset
    #[arg(value_name = "UUID")]
    pub uuid: String,
}

/// Arguments for the can-download check
#[derive(Args, Debug, Clone)]
pub struct CanDownloadArgs {
    /// Metadata UUID of the dataset
    #[arg(value_name = "UUID")]
    pub uuid: String,

    /// Coordinate system of the polygon
    #[arg(value_name = "EPSG")]
    pub coordinate_system: String,

    /// Polygon coordinates, space-separated "x y" pairs
    #[arg(value_name = "COORDINATES")]
    pub coordinates: String,
}

/// Arguments for submitting a raw order
#[derive(Args, Debug, Clone)]
pub struct OrderCreateArgs {
    /// Path to a JSON order request
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for fetching an order
#[derive(Args, Debug, Clone)]
pub struct OrderGetArgs {
    /// Order reference number
    #[arg(value_name = "REFERENCE")]
    pub reference: String,
}

/// Arguments for downloading one order file
#[derive(Args, Debug, Clone)]
pub struct DownloadFileArgs {
    /// Order reference number
    #[arg(value_name = "REFERENCE")]
    pub reference: String,

    /// File id within the order
    #[arg(value_name = "FILE_ID")]
    pub file_id: String,

    /// Destination path, defaulting to "<file-id>.zip"
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,
}

/// Arguments for the credential check
#[derive(Args, Debug, Clone)]
pub struct AuthTestArgs {
    /// URL to request with basic auth (defaults to a public echo endpoint)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl OrderDownloadArgs {
    /// Merge CLI flags over the built-in order defaults
    pub fn into_options(self) -> crate::app::order::OrderDownloadOptions {
        let defaults = crate::app::order::OrderDownloadOptions::default();
        crate::app::order::OrderDownloadOptions {
            interactive: self.interactive,
            token: self.token,
            metadata_uuid: self.metadata_uuid.unwrap_or(defaults.metadata_uuid),
            area_code: self.area_code.unwrap_or(defaults.area_code),
            area_name: self.area_name.unwrap_or(defaults.area_name),
            area_type: self.area_type.unwrap_or(defaults.area_type),
            projection_code: self.projection_code.unwrap_or(defaults.projection_code),
            projection_name: self.projection_name.unwrap_or(defaults.projection_name),
            projection_codespace: self
                .projection_codespace
                .unwrap_or(defaults.projection_codespace),
            format_code: self.format_code.unwrap_or(defaults.format_code),
            format_name: self.format_name.unwrap_or(defaults.format_name),
            format_type: self.format_type.unwrap_or(defaults.format_type),
            usage_group: self.usage_group.unwrap_or(defaults.usage_group),
            usage_purpose: self.usage_purpose.unwrap_or(defaults.usage_purpose),
            software_client: self.software_client.unwrap_or(defaults.software_client),
            software_client_version: self
                .software_client_version
                .unwrap_or(defaults.software_client_version),
            email: self.email.unwrap_or(defaults.email),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        }
    }
}

//! The order-download workflow
//!
//! Resolves a bearer token, submits a single order, re-fetches it once if
//! the creation response carried no files, then downloads each ready file
//! to the output directory. Files with the wrong status or a missing URL
//! are skipped with a logged reason; a failed download aborts the rest.

use std::path::{Path, PathBuf};

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::app::client::GeonorgeClient;
use crate::app::models::{
    AreaSelection, FormatOption, OrderFile, OrderLineRequest, OrderRequest, ProjectionOption,
};
use crate::auth::{acquire_bearer_token, ensure_credentials, select_token, TokenSource};
use crate::auth::{CredentialStore, TokenStore};
use crate::constants::{defaults, env as env_constants};
use crate::errors::Result;

/// Fully-resolved configuration for one order.
///
/// Built by merging built-in defaults, CLI flags, and (optionally)
/// interactive overrides. Updates produce a new value; the options are
/// immutable once passed to submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDownloadOptions {
    pub interactive: bool,
    pub token: Option<String>,
    pub metadata_uuid: String,
    pub area_code: String,
    pub area_name: String,
    pub area_type: String,
    pub projection_code: String,
    pub projection_name: String,
    pub projection_codespace: String,
    pub format_code: String,
    pub format_name: String,
    pub format_type: String,
    pub usage_group: String,
    pub usage_purpose: String,
    pub software_client: String,
    pub software_client_version: String,
    pub email: String,
    pub output_dir: PathBuf,
}

impl Default for OrderDownloadOptions {
    fn default() -> Self {
        Self {
            interactive: false,
            token: None,
            metadata_uuid: defaults::METADATA_UUID.to_string(),
            area_code: defaults::AREA_CODE.to_string(),
            area_name: defaults::AREA_NAME.to_string(),
            area_type: defaults::AREA_TYPE.to_string(),
            projection_code: defaults::PROJECTION_CODE.to_string(),
            projection_name: defaults::PROJECTION_NAME.to_string(),
            projection_codespace: defaults::PROJECTION_CODESPACE.to_string(),
            format_code: String::new(),
            format_name: defaults::FORMAT_NAME.to_string(),
            format_type: String::new(),
            usage_group: defaults::USAGE_GROUP.to_string(),
            usage_purpose: defaults::USAGE_PURPOSE.to_string(),
            software_client: defaults::SOFTWARE_CLIENT.to_string(),
            software_client_version: defaults::SOFTWARE_CLIENT_VERSION.to_string(),
            email: String::new(),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

impl OrderDownloadOptions {
    /// New options with the selected area applied
    pub fn with_area(self, area: &crate::app::models::AreaOption) -> Self {
        Self {
            area_code: area.code.clone(),
            area_name: area.name.clone(),
            area_type: area.kind.clone(),
            ..self
        }
    }

    /// New options with the selected projection applied.
    ///
    /// A missing codespace keeps the previous one.
    pub fn with_projection(self, projection: &ProjectionOption) -> Self {
        let codespace = projection
            .codespace
            .clone()
            .unwrap_or_else(|| self.projection_codespace.clone());
        Self {
            projection_code: projection.code.clone(),
            projection_name: projection.name.clone(),
            projection_codespace: codespace,
            ..self
        }
    }

    /// New options with the selected format applied
    pub fn with_format(self, format: &FormatOption) -> Self {
        Self {
            format_code: format.code.clone().unwrap_or_default(),
            format_name: format.name.clone(),
            format_type: format.kind.clone().unwrap_or_default(),
            ..self
        }
    }
}

/// Build the single-order-line request from resolved options.
///
/// Each selection is emitted as a one-element list; an empty email stays
/// off the wire.
pub fn build_order_request(options: &OrderDownloadOptions) -> OrderRequest {
    let email = if options.email.trim().is_empty() {
        None
    } else {
        Some(options.email.clone())
    };

    OrderRequest {
        email,
        usage_group: Some(options.usage_group.clone()),
        software_client: Some(options.software_client.clone()),
        software_client_version: Some(options.software_client_version.clone()),
        order_lines: vec![OrderLineRequest {
            metadata_uuid: options.metadata_uuid.clone(),
            areas: vec![AreaSelection {
                code: options.area_code.clone(),
                kind: options.area_type.clone(),
                name: options.area_name.clone(),
            }],
            projections: vec![ProjectionOption {
                code: options.projection_code.clone(),
                name: options.projection_name.clone(),
                codespace: Some(options.projection_codespace.clone()),
            }],
            formats: vec![FormatOption {
                code: if options.format_code.is_empty() {
                    None
                } else {
                    Some(options.format_code.clone())
                },
                name: options.format_name.clone(),
                kind: if options.format_type.is_empty() {
                    None
                } else {
                    Some(options.format_type.clone())
                },
                projections: None,
            }],
            coordinates: None,
            usage_purpose: Some(vec![options.usage_purpose.clone()]),
        }],
    }
}

/// An area's own option list wins; only an empty one triggers the
/// single dataset-wide fetch.
pub async fn area_first<T, F, Fut>(area_specific: &[T], fetch_dataset_wide: F) -> Result<Vec<T>>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = crate::errors::ApiResult<Vec<T>>>,
{
    if area_specific.is_empty() {
        Ok(fetch_dataset_wide().await?)
    } else {
        Ok(area_specific.to_vec())
    }
}

/// Next step after looking at an order's file list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilesStep {
    /// Files are listed; move on to downloading
    Download,
    /// No files yet; fetch the order once by reference number
    RefreshOnce,
    /// Still empty after the refresh; report and finish cleanly
    ReportEmpty,
}

/// File generation can lag order creation, so an empty creation response
/// gets one re-fetch by reference number. An empty list after that is a
/// successful, empty outcome, never a second fetch.
pub fn order_files_step(has_files: bool, refreshed: bool) -> OrderFilesStep {
    match (has_files, refreshed) {
        (true, _) => OrderFilesStep::Download,
        (false, false) => OrderFilesStep::RefreshOnce,
        (false, true) => OrderFilesStep::ReportEmpty,
    }
}

/// What to do with one order file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDisposition {
    /// Stream the file to `file_name` under the output directory
    Download { url: String, file_name: String },
    /// Leave the file alone, with the reason reported to the user
    Skip { reason: String },
}

/// Decide how to treat one file of the order.
///
/// Only status `ReadyForDownload` (case-insensitive) with a non-empty
/// download URL is downloadable. The destination name falls back to
/// `<fileId>.zip` when the service supplies no name.
pub fn file_disposition(file: &OrderFile) -> FileDisposition {
    let status = file.status.as_deref().unwrap_or("");
    if !status.eq_ignore_ascii_case("ReadyForDownload") {
        return FileDisposition::Skip {
            reason: format!("status '{}'", status),
        };
    }

    let url = file.download_url.as_deref().unwrap_or("").trim();
    if url.is_empty() {
        return FileDisposition::Skip {
            reason: "missing download url".to_string(),
        };
    }

    let file_name = file
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{}.zip", file.file_id));

    FileDisposition::Download {
        url: url.to_string(),
        file_name,
    }
}

/// A file that was not downloaded, with its reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

/// Per-file outcome accounting for one order-download run
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub reference_number: String,
    pub downloaded: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

impl DownloadReport {
    /// Whether the order produced no files at all
    pub fn is_empty(&self) -> bool {
        self.downloaded.is_empty() && self.skipped.is_empty()
    }
}

/// Resolve the bearer token for the order-download workflow.
///
/// Precedence: `--token` flag, then `GEONORGE_BEARER_TOKEN`, then a valid
/// cached token, then acquisition from username/password. A freshly
/// acquired token is persisted immediately. Credentials are only resolved
/// (and possibly prompted for) when acquisition is needed.
pub async fn resolve_order_token(
    explicit: Option<String>,
    metadata_uuid: &str,
    token_store: &TokenStore,
    credential_store: &CredentialStore,
    flag_username: Option<String>,
    flag_password: Option<String>,
) -> Result<String> {
    let env_token = std::env::var(env_constants::BEARER_TOKEN).ok();
    let cached = token_store.load_valid(Utc::now());

    if let Some((token, source)) = select_token(
        explicit,
        env_token,
        cached.as_ref().map(|t| t.access_token.clone()),
        None,
    ) {
        match source {
            TokenSource::Explicit => debug!("Using bearer token from --token"),
            TokenSource::Environment => {
                debug!("Using bearer token from {}", env_constants::BEARER_TOKEN)
            }
            TokenSource::Cached => {
                if let Some(cached) = &cached {
                    println!(
                        "Using cached bearer token (valid until {}).",
                        cached.expires_at.to_rfc3339()
                    );
                }
            }
            TokenSource::Acquired => {}
        }
        return Ok(token);
    }

    let credentials = ensure_credentials(flag_username, flag_password, credential_store)?;
    let acquired =
        acquire_bearer_token(metadata_uuid, &credentials.username, &credentials.password).await?;
    token_store.save(&acquired)?;
    println!("Acquired bearer token from username/password.");
    Ok(acquired.access_token)
}

/// Submit the order and download every ready file.
///
/// A creation response with zero files is re-fetched by reference number
/// exactly once before giving up; "no files" is a successful outcome.
pub async fn execute_order(
    client: &GeonorgeClient,
    options: &OrderDownloadOptions,
    token: &str,
) -> Result<DownloadReport> {
    let request = build_order_request(options);
    let mut order = client.create_order_authorized(&request, token).await?;
    println!("Order created: {}", order.reference_number);
    info!(
        "Order {} created with {} file(s)",
        order.reference_number,
        order.files.len()
    );

    let mut refreshed = false;
    loop {
        match order_files_step(!order.files.is_empty(), refreshed) {
            OrderFilesStep::Download => break,
            OrderFilesStep::RefreshOnce => {
                debug!("Creation response had no files; re-fetching order once");
                order = client
                    .get_order_authorized(&order.reference_number, token)
                    .await?;
                refreshed = true;
            }
            OrderFilesStep::ReportEmpty => {
                println!("Order created but no files were returned.");
                return Ok(DownloadReport {
                    reference_number: order.reference_number.clone(),
                    ..Default::default()
                });
            }
        }
    }

    let mut report = DownloadReport {
        reference_number: order.reference_number.clone(),
        ..Default::default()
    };

    tokio::fs::create_dir_all(&options.output_dir).await?;

    for file in &order.files {
        match file_disposition(file) {
            FileDisposition::Skip { reason } => {
                let name = display_name(file);
                warn!("Skipping file {}: {}", name, reason);
                println!("Skipping file with {}: {}", reason, name);
                report.skipped.push(SkippedFile { name, reason });
            }
            FileDisposition::Download { url, file_name } => {
                let destination = options.output_dir.join(&file_name);
                download_with_spinner(client, &url, &destination, token).await?;
                println!("Downloaded: {}", destination.display());
                report.downloaded.push(destination);
            }
        }
    }

    Ok(report)
}

fn display_name(file: &OrderFile) -> String {
    file.name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| file.file_id.clone())
}

async fn download_with_spinner(
    client: &GeonorgeClient,
    url: &str,
    destination: &Path,
    token: &str,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["◐", "◓", "◑", "◒"]),
    );
    spinner.set_message(format!("Downloading {}", destination.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let result = client.download_from_url(url, destination, Some(token)).await;
    spinner.finish_and_clear();
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::AreaOption;

    fn ready_file(name: Option<&str>, url: Option<&str>) -> OrderFile {
        OrderFile {
            download_url: url.map(String::from),
            name: name.map(String::from),
            file_id: "f-1".to_string(),
            metadata_uuid: None,
            area: None,
            area_name: None,
            projection: None,
            projection_name: None,
            format: None,
            status: Some("ReadyForDownload".to_string()),
            metadata_name: None,
            coordinates: None,
        }
    }

    #[test]
    fn defaults_match_builtins() {
        let options = OrderDownloadOptions::default();
        assert_eq!(options.metadata_uuid, defaults::METADATA_UUID);
        assert_eq!(options.area_code, defaults::AREA_CODE);
        assert_eq!(options.format_name, defaults::FORMAT_NAME);
        assert!(!options.interactive);
        assert!(options.token.is_none());
    }

    #[test]
    fn with_updates_produce_new_values() {
        let options = OrderDownloadOptions::default();
        let area = AreaOption {
            kind: "fylke".to_string(),
            name: "Vestfold".to_string(),
            code: "39".to_string(),
            projections: vec![],
            formats: vec![],
        };

        let updated = options.clone().with_area(&area);
        assert_eq!(updated.area_code, "39");
        assert_eq!(updated.area_name, "Vestfold");
        // Unrelated fields carry over.
        assert_eq!(updated.metadata_uuid, options.metadata_uuid);
    }

    #[test]
    fn with_projection_keeps_codespace_when_absent() {
        let options = OrderDownloadOptions::default();
        let original_codespace = options.projection_codespace.clone();

        let projection = ProjectionOption {
            code: "25833".to_string(),
            name: "UTM 33".to_string(),
            codespace: None,
        };
        let updated = options.with_projection(&projection);
        assert_eq!(updated.projection_code, "25833");
        assert_eq!(updated.projection_codespace, original_codespace);
    }

    #[test]
    fn order_request_has_single_element_lines() {
        let options = OrderDownloadOptions::default();
        let request = build_order_request(&options);

        assert_eq!(request.order_lines.len(), 1);
        let line = &request.order_lines[0];
        assert_eq!(line.areas.len(), 1);
        assert_eq!(line.projections.len(), 1);
        assert_eq!(line.formats.len(), 1);
        assert_eq!(
            line.usage_purpose.as_deref(),
            Some(&[defaults::USAGE_PURPOSE.to_string()][..])
        );
        // Blank email stays off the wire.
        assert!(request.email.is_none());
    }

    #[tokio::test]
    async fn area_lists_suppress_the_dataset_fetch() {
        let fetches = std::cell::Cell::new(0);
        let nested = vec!["a".to_string()];

        let result = area_first(&nested, || {
            fetches.set(fetches.get() + 1);
            async { Ok::<_, crate::errors::ApiError>(vec!["b".to_string()]) }
        })
        .await
        .unwrap();

        assert_eq!(result, nested);
        assert_eq!(fetches.get(), 0);
    }

    #[tokio::test]
    async fn empty_area_list_fetches_dataset_wide_exactly_once() {
        let fetches = std::cell::Cell::new(0);
        let fallback = vec!["b".to_string(), "c".to_string()];
        let served = fallback.clone();

        let result = area_first::<String, _, _>(&[], || {
            fetches.set(fetches.get() + 1);
            async move { Ok::<_, crate::errors::ApiError>(served) }
        })
        .await
        .unwrap();

        assert_eq!(result, fallback);
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn empty_order_is_refreshed_exactly_once() {
        assert_eq!(order_files_step(false, false), OrderFilesStep::RefreshOnce);
        // The refresh coming back empty ends the run cleanly instead of
        // fetching again.
        assert_eq!(order_files_step(false, true), OrderFilesStep::ReportEmpty);
    }

    #[test]
    fn orders_with_files_go_straight_to_download() {
        assert_eq!(order_files_step(true, false), OrderFilesStep::Download);
        assert_eq!(order_files_step(true, true), OrderFilesStep::Download);
    }

    #[test]
    fn ready_file_with_url_downloads() {
        let file = ready_file(Some("data.zip"), Some("https://example.com/f-1"));
        assert_eq!(
            file_disposition(&file),
            FileDisposition::Download {
                url: "https://example.com/f-1".to_string(),
                file_name: "data.zip".to_string(),
            }
        );
    }

    #[test]
    fn status_match_is_case_insensitive() {
        let mut file = ready_file(Some("data.zip"), Some("https://example.com/f-1"));
        file.status = Some("readyfordownload".to_string());
        assert!(matches!(
            file_disposition(&file),
            FileDisposition::Download { .. }
        ));
    }

    #[test]
    fn non_ready_status_skips() {
        let mut file = ready_file(Some("data.zip"), Some("https://example.com/f-1"));
        file.status = Some("Pending".to_string());
        match file_disposition(&file) {
            FileDisposition::Skip { reason } => assert!(reason.contains("Pending")),
            other => panic!("Expected skip, got {:?}", other),
        }

        file.status = None;
        assert!(matches!(
            file_disposition(&file),
            FileDisposition::Skip { .. }
        ));
    }

    #[test]
    fn missing_url_skips() {
        for url in [None, Some(""), Some("   ")] {
            let file = ready_file(Some("data.zip"), url);
            match file_disposition(&file) {
                FileDisposition::Skip { reason } => {
                    assert_eq!(reason, "missing download url")
                }
                other => panic!("Expected skip, got {:?}", other),
            }
        }
    }

    #[test]
    fn missing_name_falls_back_to_file_id() {
        for name in [None, Some(""), Some("  ")] {
            let file = ready_file(name, Some("https://example.com/f-1"));
            match file_disposition(&file) {
                FileDisposition::Download { file_name, .. } => {
                    assert_eq!(file_name, "f-1.zip")
                }
                other => panic!("Expected download, got {:?}", other),
            }
        }
    }

    #[test]
    fn two_file_order_accounts_for_both() {
        // One ready file with a URL, one pending: exactly one download
        // decision and one skip decision.
        let ready = ready_file(Some("ready.zip"), Some("https://example.com/f-1"));
        let mut pending = ready_file(Some("pending.zip"), Some("https://example.com/f-2"));
        pending.status = Some("Pending".to_string());

        let decisions: Vec<_> = [&ready, &pending].iter().map(|f| file_disposition(f)).collect();
        let downloads = decisions
            .iter()
            .filter(|d| matches!(d, FileDisposition::Download { .. }))
            .count();
        let skips = decisions
            .iter()
            .filter(|d| matches!(d, FileDisposition::Skip { .. }))
            .count();
        assert_eq!((downloads, skips), (1, 1));
    }
}

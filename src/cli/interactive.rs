//! Interactive order configuration
//!
//! Walks the user through dataset search, area, projection, format, and
//! usage questions, starting each prompt at the current option value.
//! Catalog and codelist lookups that fail degrade to free-text entry so
//! the order can still be placed offline from the catalog.

use tracing::warn;

use crate::app::catalog::{CatalogClient, CodelistEntry};
use crate::app::client::GeonorgeClient;
use crate::app::models::DatasetHit;
use crate::app::order::{area_first, OrderDownloadOptions};
use crate::cli::prompt::{default_index, prompt_text, select_index, select_option, LineReader};
use crate::constants::{defaults, services};
use crate::errors::{ConfigError, Result};

/// Ask every order question in sequence, returning the updated options.
///
/// Option lists come from the bearer-authenticated endpoints; the token
/// is already resolved by the time the walkthrough starts.
pub async fn configure_interactively(
    reader: &mut dyn LineReader,
    client: &GeonorgeClient,
    options: OrderDownloadOptions,
    token: &str,
) -> Result<OrderDownloadOptions> {
    let dataset = select_dataset(reader, &options.metadata_uuid).await?;
    let options = OrderDownloadOptions {
        metadata_uuid: dataset.uuid.clone(),
        ..options
    };

    let areas = client
        .get_areas_authorized(&options.metadata_uuid, token)
        .await?;
    if areas.is_empty() {
        return Err(ConfigError::NoOptions { what: "areas" }.into());
    }
    let area_default = default_index(&areas, |a| a.code == options.area_code);
    let area = select_option(reader, "Select area", &areas, area_default, |a| {
        format!("{} ({}) [{}]", a.name, a.kind, a.code)
    })?
    .clone();

    // Area-specific option lists win; an empty one triggers the single
    // dataset-wide fetch.
    let projections = area_first(&area.projections, || {
        client.get_projections_authorized(&options.metadata_uuid, token)
    })
    .await?;
    if projections.is_empty() {
        return Err(ConfigError::NoOptions { what: "projections" }.into());
    }
    let projection_default = default_index(&projections, |p| p.code == options.projection_code);
    let projection = select_option(
        reader,
        "Select projection",
        &projections,
        projection_default,
        |p| format!("{} [{}]", p.name, p.code),
    )?
    .clone();

    let formats = area_first(&area.formats, || {
        client.get_formats_authorized(&options.metadata_uuid, token)
    })
    .await?;
    if formats.is_empty() {
        return Err(ConfigError::NoOptions { what: "formats" }.into());
    }
    let format_default = default_index(&formats, |f| f.name == options.format_name);
    let format = select_option(reader, "Select format", &formats, format_default, |f| {
        match f.code.as_deref() {
            Some(code) if !code.is_empty() => format!("{} [{}]", f.name, code),
            _ => f.name.clone(),
        }
    })?
    .clone();

    let options = options
        .with_area(&area)
        .with_projection(&projection)
        .with_format(&format);

    let catalog = CatalogClient::new()?;
    let usage_group = select_codelist_value(
        reader,
        &catalog,
        services::USAGE_GROUP_CODELIST_URL,
        "Select user group",
        &options.usage_group,
    )
    .await?;
    let usage_purpose = select_codelist_value(
        reader,
        &catalog,
        services::USAGE_PURPOSE_CODELIST_URL,
        "Select purpose",
        &options.usage_purpose,
    )
    .await?;

    let software_client = prompt_text(reader, "Software client", &options.software_client, false)?;
    let software_client_version = prompt_text(
        reader,
        "Software client version",
        &options.software_client_version,
        false,
    )?;
    let email = prompt_text(reader, "Email (optional)", &options.email, true)?;
    let output_dir = prompt_text(
        reader,
        "Output directory",
        &options.output_dir.display().to_string(),
        false,
    )?;

    Ok(OrderDownloadOptions {
        usage_group,
        usage_purpose,
        software_client,
        software_client_version,
        email,
        output_dir: output_dir.into(),
        ..options
    })
}

/// Search the catalog and pick a dataset, re-asking on empty results.
///
/// The hit matching the currently configured dataset, if present, is the
/// pre-selected default.
async fn select_dataset(reader: &mut dyn LineReader, current_uuid: &str) -> Result<DatasetHit> {
    let catalog = CatalogClient::new()?;
    let mut query = defaults::SEARCH_QUERY.to_string();
    loop {
        query = prompt_text(reader, "Dataset search", &query, false)?;
        let hits = catalog.search_datasets(&query).await?;
        if hits.is_empty() {
            println!("No datasets matched '{}'.", query);
            continue;
        }
        let default = dataset_default_index(&hits, current_uuid);
        let chosen = select_option(reader, "Select dataset", &hits, default, |hit| {
            format!("{} ({})", hit.title, hit.organization)
        })?;
        return Ok(chosen.clone());
    }
}

/// 1-based default position for dataset selection: the first hit whose
/// UUID matches the configured one, else the first hit
fn dataset_default_index(hits: &[DatasetHit], current_uuid: &str) -> usize {
    default_index(hits, |hit| hit.uuid.eq_ignore_ascii_case(current_uuid))
}

/// Pick a codelist value, falling back to free text when the codelist
/// cannot be fetched or is empty
async fn select_codelist_value(
    reader: &mut dyn LineReader,
    catalog: &CatalogClient,
    url: &str,
    label: &str,
    current: &str,
) -> Result<String> {
    let entries = match catalog.fetch_codelist(url).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Codelist fetch failed ({}); falling back to text entry", err);
            Vec::new()
        }
    };

    if entries.is_empty() {
        return prompt_text(reader, label, current, false);
    }

    let default = default_index(&entries, |entry: &CodelistEntry| entry.matches(current));
    for (i, entry) in entries.iter().enumerate() {
        println!("  [{}] {}", i + 1, entry.label);
    }
    let index = select_index(reader, label, entries.len(), default)?;
    Ok(entries[index].label.clone())
}

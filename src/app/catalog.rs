//! Kartkatalog search and codelist lookups
//!
//! Read-only queries against the catalog endpoints: a free-text dataset
//! search and the usage-group/usage-purpose codelists. Codelist fetches
//! are best-effort; callers fall back to free-text entry when they fail.

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::app::models::DatasetHit;
use crate::constants::{http, services};
use crate::errors::{ApiError, ApiResult};

/// One selectable codelist value.
///
/// `keys` carries the label plus every other string-valued field of the
/// entry, so defaults can match either a display label or an internal
/// code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodelistEntry {
    pub label: String,
    pub keys: Vec<String>,
}

impl CodelistEntry {
    /// Case-insensitive match against any of the entry's keys
    pub fn matches(&self, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        self.keys.iter().any(|key| key.to_lowercase() == needle)
    }
}

/// Client for the fixed catalog hosts
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
}

impl CatalogClient {
    pub fn new() -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(http::DEFAULT_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .user_agent(http::USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Free-text dataset search against Kartkatalog.
    ///
    /// Only entries of type "dataset" with a UUID survive; duplicates by
    /// UUID keep the first-seen title and organization.
    pub async fn search_datasets(&self, query: &str) -> ApiResult<Vec<DatasetHit>> {
        let response = self
            .client
            .get(services::CATALOG_SEARCH_URL)
            .query(&[
                ("text", query),
                ("page", "1"),
                ("pageSize", &services::CATALOG_SEARCH_PAGE_SIZE.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        let root: Value = serde_json::from_str(&body)?;
        let hits = parse_search_results(&root);
        debug!("Catalog search '{}' returned {} datasets", query, hits.len());
        Ok(hits)
    }

    /// Fetch and parse one codelist resource.
    ///
    /// Errors here are expected to be downgraded by the caller into a
    /// free-text prompt.
    pub async fn fetch_codelist(&self, url: &str) -> ApiResult<Vec<CodelistEntry>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        let root: Value = serde_json::from_str(&body)?;
        Ok(parse_codelist(&root))
    }
}

/// Extract dataset hits from a Kartkatalog search response
pub fn parse_search_results(root: &Value) -> Vec<DatasetHit> {
    let results = match root.get("Results").and_then(Value::as_array) {
        Some(results) => results,
        None => return Vec::new(),
    };

    let mut hits: Vec<DatasetHit> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for result in results {
        let is_dataset = result
            .get("Type")
            .and_then(Value::as_str)
            .map(|t| t.eq_ignore_ascii_case("dataset"))
            .unwrap_or(false);
        if !is_dataset {
            continue;
        }

        let uuid = match result.get("Uuid").and_then(Value::as_str) {
            Some(uuid) if !uuid.trim().is_empty() => uuid.to_string(),
            _ => continue,
        };

        let key = uuid.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let title = result
            .get("Title")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&uuid)
            .to_string();
        let organization = result
            .get("Organization")
            .and_then(Value::as_str)
            .filter(|o| !o.trim().is_empty())
            .unwrap_or("Unknown")
            .to_string();

        hits.push(DatasetHit {
            uuid,
            title,
            organization,
        });
    }

    hits
}

/// Extract codelist entries from a register.geonorge.no response.
///
/// Entries without a `label` are dropped; duplicate labels merge their
/// alternate keys; the result is sorted by label.
pub fn parse_codelist(root: &Value) -> Vec<CodelistEntry> {
    let items = match root.get("containeditems").and_then(Value::as_array) {
        Some(items) => items,
        None => return Vec::new(),
    };

    let mut entries: Vec<CodelistEntry> = Vec::new();

    for item in items {
        let object = match item.as_object() {
            Some(object) => object,
            None => continue,
        };

        let label = match object.get("label").and_then(Value::as_str) {
            Some(label) if !label.trim().is_empty() => label.trim().to_string(),
            _ => continue,
        };

        let mut keys = vec![label.clone()];
        for value in object.values() {
            if let Some(text) = value.as_str() {
                let text = text.trim();
                if !text.is_empty() && !keys.iter().any(|k| k.to_lowercase() == text.to_lowercase())
                {
                    keys.push(text.to_string());
                }
            }
        }

        match entries
            .iter_mut()
            .find(|entry| entry.label.to_lowercase() == label.to_lowercase())
        {
            Some(existing) => {
                for key in keys {
                    if !existing
                        .keys
                        .iter()
                        .any(|k| k.to_lowercase() == key.to_lowercase())
                    {
                        existing.keys.push(key);
                    }
                }
            }
            None => entries.push(CodelistEntry { label, keys }),
        }
    }

    entries.sort_by(|a, b| a.label.cmp(&b.label));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_filters_to_datasets() {
        let root = json!({
            "Results": [
                {"Type": "service", "Uuid": "s-1", "Title": "A service"},
                {"Type": "dataset", "Uuid": "d-1", "Title": "FKB", "Organization": "Kartverket"},
                {"Type": "DATASET", "Uuid": "d-2", "Title": "AR5"}
            ]
        });

        let hits = parse_search_results(&root);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].uuid, "d-1");
        assert_eq!(hits[0].organization, "Kartverket");
        // Missing organization falls back.
        assert_eq!(hits[1].organization, "Unknown");
    }

    #[test]
    fn search_dedupes_by_uuid_preserving_first() {
        let root = json!({
            "Results": [
                {"Type": "dataset", "Uuid": "d-1", "Title": "First title"},
                {"Type": "dataset", "Uuid": "D-1", "Title": "Second title"}
            ]
        });

        let hits = parse_search_results(&root);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "First title");
    }

    #[test]
    fn search_skips_entries_without_uuid() {
        let root = json!({
            "Results": [
                {"Type": "dataset", "Title": "No uuid"},
                {"Type": "dataset", "Uuid": "  ", "Title": "Blank uuid"},
                {"Type": "dataset", "Uuid": "d-1"}
            ]
        });

        let hits = parse_search_results(&root);
        assert_eq!(hits.len(), 1);
        // Title falls back to the uuid.
        assert_eq!(hits[0].title, "d-1");
    }

    #[test]
    fn search_tolerates_missing_results_array() {
        assert!(parse_search_results(&json!({})).is_empty());
        assert!(parse_search_results(&json!({"Results": "nope"})).is_empty());
    }

    #[test]
    fn codelist_collects_alternate_keys() {
        let root = json!({
            "containeditems": [
                {"label": "Næringsliv", "codevalue": "naeringsliv", "status": "Gyldig"}
            ]
        });

        let entries = parse_codelist(&root);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "Næringsliv");
        assert!(entries[0].matches("naeringsliv"));
        assert!(entries[0].matches("NÆRINGSLIV"));
        assert!(entries[0].matches("Gyldig"));
        assert!(!entries[0].matches("offentlig"));
    }

    #[test]
    fn codelist_merges_duplicate_labels_and_sorts() {
        let root = json!({
            "containeditems": [
                {"label": "Beta", "codevalue": "b1"},
                {"label": "Alpha", "codevalue": "a1"},
                {"label": "beta", "codevalue": "b2"}
            ]
        });

        let entries = parse_codelist(&root);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "Alpha");
        assert_eq!(entries[1].label, "Beta");
        assert!(entries[1].matches("b1"));
        assert!(entries[1].matches("b2"));
    }

    #[test]
    fn codelist_drops_unlabeled_entries() {
        let root = json!({
            "containeditems": [
                {"codevalue": "no-label"},
                {"label": "   "},
                42
            ]
        });
        assert!(parse_codelist(&root).is_empty());
    }
}

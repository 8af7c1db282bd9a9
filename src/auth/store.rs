//! On-disk stores for credentials and the cached bearer token
//!
//! Both stores persist a single JSON value under the application-private
//! config directory. They never validate anything against the server:
//! token validity is judged solely by the locally stored expiry.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{auth, files};
use crate::errors::{AppError, Result};

/// A persisted username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub username: String,
    pub password: String,
}

/// A persisted bearer token with its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Whether the token is still usable at `now`.
    ///
    /// Expiry must be strictly later than `now` plus the safety margin;
    /// a token expiring exactly at the margin is invalid.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.trim().is_empty() {
            return false;
        }
        let margin = Duration::from_std(auth::EXPIRY_MARGIN)
            .expect("expiry margin fits in chrono::Duration");
        self.expires_at > now + margin
    }
}

/// Resolve the default application-private directory for cache files
fn default_app_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(files::APP_DIR_NAME))
        .ok_or_else(|| AppError::generic("Could not determine config directory"))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| AppError::generic(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// File-backed store for the username/password pair
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store at the default application-private location
    pub fn new() -> Result<Self> {
        Ok(Self::at_root(&default_app_dir()?))
    }

    /// Create a store rooted at an explicit directory (used by tests)
    pub fn at_root(root: &Path) -> Self {
        Self {
            path: root.join(files::CREDENTIALS_FILE_NAME),
        }
    }

    /// Load stored credentials.
    ///
    /// A missing, unreadable, or unparsable file yields `None`.
    pub fn load(&self) -> Option<StoredCredentials> {
        read_json(&self.path)
    }

    /// Persist credentials, creating parent directories as needed
    pub fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        write_json(&self.path, credentials)
    }

    /// Remove stored credentials; a missing file is not an error
    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// File-backed store for the cached bearer token
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store at the default application-private location
    pub fn new() -> Result<Self> {
        Ok(Self::at_root(&default_app_dir()?))
    }

    /// Create a store rooted at an explicit directory (used by tests)
    pub fn at_root(root: &Path) -> Self {
        Self {
            path: root.join(files::BEARER_TOKEN_FILE_NAME),
        }
    }

    /// Load the stored token regardless of expiry
    pub fn load(&self) -> Option<StoredToken> {
        read_json(&self.path)
    }

    /// Load the stored token only if it is still valid.
    ///
    /// An expired token is treated as absent but is not deleted here;
    /// deletion only happens on `clear`.
    pub fn load_valid(&self, now: DateTime<Utc>) -> Option<StoredToken> {
        self.load().filter(|token| token.is_valid_at(now))
    }

    /// Persist a token, creating parent directories as needed
    pub fn save(&self, token: &StoredToken) -> Result<()> {
        write_json(&self.path, token)
    }

    /// Remove the stored token; a missing file is not an error
    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_token(expires_at: DateTime<Utc>) -> StoredToken {
        StoredToken {
            access_token: "abc123".to_string(),
            expires_at,
        }
    }

    #[test]
    fn credential_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::at_root(dir.path());

        let credentials = StoredCredentials {
            username: "kari".to_string(),
            password: "hunter2".to_string(),
        };
        store.save(&credentials).unwrap();
        assert_eq!(store.load(), Some(credentials));
    }

    #[test]
    fn token_round_trip_before_expiry() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::at_root(dir.path());

        let now = Utc::now();
        let token = sample_token(now + Duration::hours(1));
        store.save(&token).unwrap();
        assert_eq!(store.load_valid(now), Some(token));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(CredentialStore::at_root(dir.path()).load().is_none());
        assert!(TokenStore::at_root(dir.path()).load().is_none());
    }

    #[test]
    fn unparsable_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::at_root(dir.path());
        fs::write(store.path(), "not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn expiry_exactly_at_margin_is_invalid() {
        let now = Utc::now();
        let margin = Duration::from_std(auth::EXPIRY_MARGIN).unwrap();

        let at_margin = sample_token(now + margin);
        assert!(!at_margin.is_valid_at(now));

        let just_past_margin = sample_token(now + margin + Duration::seconds(1));
        assert!(just_past_margin.is_valid_at(now));

        let expired = sample_token(now - Duration::seconds(1));
        assert!(!expired.is_valid_at(now));
    }

    #[test]
    fn expired_token_not_deleted_on_load() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::at_root(dir.path());

        let now = Utc::now();
        store.save(&sample_token(now)).unwrap();

        assert!(store.load_valid(now).is_none());
        // The file survives; only clear() removes it.
        assert!(store.path().exists());
        assert!(store.load().is_some());
    }

    #[test]
    fn empty_access_token_is_invalid() {
        let now = Utc::now();
        let token = StoredToken {
            access_token: "  ".to_string(),
            expires_at: now + Duration::hours(1),
        };
        assert!(!token.is_valid_at(now));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::at_root(dir.path());

        // Clearing a store that never saved anything is fine.
        store.clear().unwrap();

        store
            .save(&StoredCredentials {
                username: "kari".to_string(),
                password: "hunter2".to_string(),
            })
            .unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }
}

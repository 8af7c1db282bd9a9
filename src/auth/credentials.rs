//! Credential resolution and interactive prompting
//!
//! Resolution precedence: CLI flags, then environment variables, then the
//! on-disk credential store, then an interactive prompt. Prompted
//! credentials are persisted so the next invocation starts authenticated.

use std::env;
use std::io::{self, Write};

use tracing::{debug, info};

use crate::auth::store::{CredentialStore, StoredCredentials};
use crate::constants::env as env_constants;
use crate::errors::{AppError, AuthError, ConfigError, Result};

/// Validate a username/password pair where each half is optional.
///
/// Both present yields credentials, both absent yields `None`, and a
/// half-supplied pair is a configuration error.
pub fn pair_credentials(
    username: Option<String>,
    password: Option<String>,
) -> std::result::Result<Option<StoredCredentials>, ConfigError> {
    let username = username.filter(|u| !u.is_empty());
    let password = password.filter(|p| !p.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(StoredCredentials { username, password })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::IncompleteCredentialPair {
            provided: "Username",
            missing: "password",
        }),
        (None, Some(_)) => Err(ConfigError::IncompleteCredentialPair {
            provided: "Password",
            missing: "username",
        }),
    }
}

/// Credentials from flags or environment only, without touching the store.
///
/// Used by the plain pass-through commands, which attach basic auth when
/// credentials happen to be available but never prompt for them.
pub fn optional_credentials(
    flag_username: Option<String>,
    flag_password: Option<String>,
) -> Result<Option<StoredCredentials>> {
    if let Some(credentials) = pair_credentials(flag_username, flag_password)? {
        return Ok(Some(credentials));
    }
    let from_env = pair_credentials(
        env::var(env_constants::USERNAME).ok(),
        env::var(env_constants::PASSWORD).ok(),
    )?;
    Ok(from_env)
}

/// Resolve credentials for an authenticated command.
///
/// Falls through flags, environment, and the store before prompting.
/// Prompting requires a terminal; with redirected stdin this is a
/// configuration error instead.
pub fn ensure_credentials(
    flag_username: Option<String>,
    flag_password: Option<String>,
    store: &CredentialStore,
) -> Result<StoredCredentials> {
    if let Some(credentials) = optional_credentials(flag_username, flag_password)? {
        debug!("Using credentials from flags or environment");
        return Ok(credentials);
    }

    if let Some(stored) = store.load() {
        if !stored.username.trim().is_empty() && !stored.password.trim().is_empty() {
            debug!("Using stored credentials for {}", stored.username);
            return Ok(stored);
        }
    }

    if !atty::is(atty::Stream::Stdin) {
        return Err(ConfigError::PromptUnavailable.into());
    }

    let credentials = prompt_credentials()?;
    store.save(&credentials)?;
    info!("Credentials saved to {}", store.path().display());
    Ok(credentials)
}

/// Prompt for a username on stdin and a masked password
pub fn prompt_credentials() -> Result<StoredCredentials> {
    print!("GeoNorge username: ");
    io::stdout().flush().map_err(AuthError::Prompt)?;

    let mut username = String::new();
    io::stdin()
        .read_line(&mut username)
        .map_err(AuthError::Prompt)?;
    let username = username.trim().to_string();

    if username.is_empty() {
        return Err(AppError::Config(ConfigError::RequiredValue {
            label: "Username".to_string(),
        }));
    }

    let password = rpassword::prompt_password("GeoNorge password: ")
        .map_err(|e| AuthError::Prompt(io::Error::new(io::ErrorKind::Other, e)))?;

    if password.is_empty() {
        return Err(AppError::Config(ConfigError::RequiredValue {
            label: "Password".to_string(),
        }));
    }

    Ok(StoredCredentials { username, password })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_pair_resolves() {
        let credentials = pair_credentials(Some("kari".into()), Some("hunter2".into()))
            .unwrap()
            .unwrap();
        assert_eq!(credentials.username, "kari");
        assert_eq!(credentials.password, "hunter2");
    }

    #[test]
    fn absent_pair_is_none() {
        assert!(pair_credentials(None, None).unwrap().is_none());
        // Empty strings behave like absence.
        assert!(pair_credentials(Some(String::new()), None).unwrap().is_none());
    }

    #[test]
    fn half_supplied_pair_is_an_error() {
        assert!(matches!(
            pair_credentials(Some("kari".into()), None),
            Err(ConfigError::IncompleteCredentialPair { .. })
        ));
        assert!(matches!(
            pair_credentials(None, Some("hunter2".into())),
            Err(ConfigError::IncompleteCredentialPair { .. })
        ));
    }

    #[test]
    fn flags_win_over_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = CredentialStore::at_root(dir.path());
        store
            .save(&StoredCredentials {
                username: "stored".into(),
                password: "stored-pass".into(),
            })
            .unwrap();

        let credentials =
            ensure_credentials(Some("flag".into()), Some("flag-pass".into()), &store).unwrap();
        assert_eq!(credentials.username, "flag");
    }

    #[test]
    fn store_used_when_no_flags() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = CredentialStore::at_root(dir.path());
        store
            .save(&StoredCredentials {
                username: "stored".into(),
                password: "stored-pass".into(),
            })
            .unwrap();

        let credentials = ensure_credentials(None, None, &store).unwrap();
        assert_eq!(credentials.username, "stored");
    }
}

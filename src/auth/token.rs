//! Bearer token acquisition and source precedence
//!
//! Tokens come from four sources with a strict precedence: an explicit
//! flag wins over the environment, which wins over a valid cached token,
//! which wins over acquiring a fresh one from the identity provider.

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::auth::store::StoredToken;
use crate::constants::{auth, http};
use crate::errors::{AuthError, AuthResult};

/// Where a resolved bearer token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Supplied directly via `--token`
    Explicit,
    /// Taken from `GEONORGE_BEARER_TOKEN`
    Environment,
    /// Loaded from the token cache (still valid)
    Cached,
    /// Freshly acquired from the identity provider
    Acquired,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Pick the highest-precedence token among the present sources.
///
/// Blank strings count as absent. Returns `None` only when every source
/// is absent.
pub fn select_token(
    explicit: Option<String>,
    environment: Option<String>,
    cached: Option<String>,
    acquired: Option<String>,
) -> Option<(String, TokenSource)> {
    non_blank(explicit)
        .map(|t| (t, TokenSource::Explicit))
        .or_else(|| non_blank(environment).map(|t| (t, TokenSource::Environment)))
        .or_else(|| non_blank(cached).map(|t| (t, TokenSource::Cached)))
        .or_else(|| non_blank(acquired).map(|t| (t, TokenSource::Acquired)))
}

/// Wire shape of the identity provider's token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// Parse a token response body into a stored token.
///
/// `expires_in` absent or non-positive falls back to the default lifetime.
/// The raw body travels with the error when no usable access token is
/// present.
fn token_from_response(body: &str, now: chrono::DateTime<Utc>) -> AuthResult<StoredToken> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|_| AuthError::TokenAcquisition {
            body: body.to_string(),
        })?;

    let access_token = parsed
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AuthError::TokenAcquisition {
            body: body.to_string(),
        })?;

    let expires_in = parsed
        .expires_in
        .filter(|secs| *secs > 0)
        .unwrap_or(auth::DEFAULT_EXPIRES_IN_SECS);

    Ok(StoredToken {
        access_token,
        expires_at: now + Duration::seconds(expires_in),
    })
}

/// Exchange credentials for a short-lived bearer token via the GeoID
/// password grant.
///
/// The dataset UUID is informational only; it is logged but not part of
/// the request body.
pub async fn acquire_bearer_token(
    metadata_uuid: &str,
    username: &str,
    password: &str,
) -> AuthResult<StoredToken> {
    debug!("Acquiring bearer token for dataset {}", metadata_uuid);

    let client = reqwest::Client::builder()
        .timeout(http::DEFAULT_TIMEOUT)
        .connect_timeout(http::CONNECT_TIMEOUT)
        .user_agent(http::USER_AGENT)
        .build()?;

    let params = [
        ("grant_type", "password"),
        ("client_id", auth::CLIENT_ID),
        ("username", username),
        ("password", password),
        ("scope", auth::SCOPE),
    ];

    let response = client.post(auth::TOKEN_ENDPOINT).form(&params).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AuthError::TokenAcquisition { body });
    }

    token_from_response(&body, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_covers_all_presence_combinations() {
        // Sources ordered highest to lowest precedence; bit i of the mask
        // controls presence of source i.
        let sources = [
            ("explicit", TokenSource::Explicit),
            ("environment", TokenSource::Environment),
            ("cached", TokenSource::Cached),
            ("acquired", TokenSource::Acquired),
        ];

        for mask in 0u8..16 {
            let present: Vec<Option<String>> = (0..4)
                .map(|i| {
                    if mask & (1 << i) != 0 {
                        Some(sources[i].0.to_string())
                    } else {
                        None
                    }
                })
                .collect();

            let selected = select_token(
                present[0].clone(),
                present[1].clone(),
                present[2].clone(),
                present[3].clone(),
            );

            let expected = (0..4)
                .find(|i| mask & (1 << i) != 0)
                .map(|i| (sources[i].0.to_string(), sources[i].1));

            assert_eq!(selected, expected, "mask {:04b}", mask);
        }
    }

    #[test]
    fn blank_tokens_count_as_absent() {
        let selected = select_token(
            Some("   ".to_string()),
            Some(String::new()),
            Some("cached".to_string()),
            None,
        );
        assert_eq!(selected, Some(("cached".to_string(), TokenSource::Cached)));
    }

    #[test]
    fn parses_token_with_expires_in() {
        let now = Utc::now();
        let token =
            token_from_response(r#"{"access_token":"tok","expires_in":3600}"#, now).unwrap();
        assert_eq!(token.access_token, "tok");
        assert_eq!(token.expires_at, now + Duration::seconds(3600));
    }

    #[test]
    fn missing_expires_in_defaults() {
        let now = Utc::now();
        let token = token_from_response(r#"{"access_token":"tok"}"#, now).unwrap();
        assert_eq!(
            token.expires_at,
            now + Duration::seconds(auth::DEFAULT_EXPIRES_IN_SECS)
        );
    }

    #[test]
    fn non_positive_expires_in_defaults() {
        let now = Utc::now();
        for body in [
            r#"{"access_token":"tok","expires_in":0}"#,
            r#"{"access_token":"tok","expires_in":-5}"#,
        ] {
            let token = token_from_response(body, now).unwrap();
            assert_eq!(
                token.expires_at,
                now + Duration::seconds(auth::DEFAULT_EXPIRES_IN_SECS)
            );
        }
    }

    #[test]
    fn missing_access_token_keeps_body() {
        let body = r#"{"error":"invalid_grant"}"#;
        let err = token_from_response(body, Utc::now()).unwrap_err();
        match err {
            AuthError::TokenAcquisition { body: kept } => assert_eq!(kept, body),
            other => panic!("Expected TokenAcquisition, got {:?}", other),
        }
    }

    #[test]
    fn unparsable_body_keeps_body() {
        let err = token_from_response("<html>oops</html>", Utc::now()).unwrap_err();
        match err {
            AuthError::TokenAcquisition { body } => assert_eq!(body, "<html>oops</html>"),
            other => panic!("Expected TokenAcquisition, got {:?}", other),
        }
    }
}

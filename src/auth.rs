//! OAuth2 client-credentials authentication for the BSN.cloud API.
//!
//! Acquires bearer tokens from the token endpoint using the
//! `client_credentials` grant. The token is cached in `TokenProvider` and
//! refreshed on demand. `BsnClient` reads the cached token via `token()` and
//! calls `refresh_token()` when it is absent or stale.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Default token endpoint for BSN.cloud.
pub const DEFAULT_TOKEN_URL: &str =
    "https://auth.bsn.cloud/realms/bsncloud/protocol/openid-connect/token";

/// Token requests are small; they never need the long API timeout.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Safety buffer subtracted from `expires_in` so a request never races the
/// expiry boundary.
const EXPIRY_BUFFER_SECS: u64 = 60;

/// Form body sent to the token endpoint.
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
}

/// Subset of the token response that we need. Extra fields such as
/// `refresh_expires_in` or `scope` are ignored.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Manages OAuth2 token acquisition and caching.
///
/// Invariants:
/// - `response` is `None` until the first successful `refresh_token()` call.
/// - `acquired_at` is `Some` whenever `response` is `Some`.
pub struct TokenProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    response: Option<TokenResponse>,
    acquired_at: Option<Instant>,
}

impl TokenProvider {
    pub fn new(token_url: &str, client_id: &str, client_secret: &str) -> Self {
        TokenProvider {
            client: build_token_client(),
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            response: None,
            acquired_at: None,
        }
    }

    /// Creates a `TokenProvider` with a pre-set token, bypassing the token
    /// endpoint. Used by tests; the token is treated as freshly acquired
    /// with a one hour lifetime.
    pub fn with_token(token: &str) -> Self {
        TokenProvider {
            client: build_token_client(),
            token_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            response: Some(TokenResponse {
                access_token: token.to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
            }),
            acquired_at: Some(Instant::now()),
        }
    }

    /// Fetches a new token and caches it.
    ///
    /// The body is read as text before the status check so the endpoint's
    /// error description ends up in the error.
    pub async fn refresh_token(&mut self) -> Result<()> {
        let form = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: "client_credentials",
        };

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::Auth {
                message: format!("token endpoint unreachable: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ApiError::Auth {
                message: format!("token request failed ({status}): {body}"),
                source: None,
            });
        }

        let resp: TokenResponse = serde_json::from_str(&body).map_err(|e| ApiError::Auth {
            message: "failed to parse token response".to_string(),
            source: Some(Box::new(e)),
        })?;

        tracing::debug!(expires_in = resp.expires_in, "acquired access token");
        self.acquired_at = Some(Instant::now());
        self.response = Some(resp);

        Ok(())
    }

    /// Drops the cached token so the next request re-authenticates.
    pub fn invalidate(&mut self) {
        self.response = None;
        self.acquired_at = None;
    }

    fn is_expired(&self) -> bool {
        match (&self.response, self.acquired_at) {
            (Some(resp), Some(acquired)) => {
                let lifetime = resp.expires_in.saturating_sub(EXPIRY_BUFFER_SECS);
                acquired.elapsed().as_secs() >= lifetime
            }
            _ => false,
        }
    }

    /// Returns the cached access token, or `None` if no token exists or it
    /// is within the expiry buffer.
    pub fn token(&self) -> Option<&str> {
        if self.is_expired() {
            return None;
        }
        self.response.as_ref().map(|ret| ret.access_token.as_str())
    }
}

fn build_token_client() -> reqwest::Client {
    // Builder only fails when the TLS backend cannot initialise; fall back to
    // the default client rather than panicking in a constructor.
    reqwest::Client::builder()
        .timeout(TOKEN_REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

//! Connection settings for the API client.
//!
//! Values come from command-line flags with environment fallbacks (see
//! [`crate::cli::CommonArgs`]); this module only turns them into a client.

use std::time::Duration;

use crate::auth::TokenProvider;
use crate::client::BsnClient;

pub const NETWORK_ENV: &str = "BSN_NETWORK";
pub const CLIENT_ID_ENV: &str = "BSN_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "BSN_CLIENT_SECRET";
pub const API_URL_ENV: &str = "BSN_API_URL";
pub const TOKEN_URL_ENV: &str = "BSN_TOKEN_URL";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Builds the authenticated client. No request is sent until the first
    /// API call.
    pub fn connect(&self) -> crate::error::Result<BsnClient> {
        let auth = TokenProvider::new(&self.token_url, &self.client_id, &self.client_secret);
        BsnClient::with_base_url(auth, &normalize_base_url(&self.base_url), self.timeout)
    }
}

/// Request paths are joined without a separator, so the root must end in `/`.
fn normalize_base_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

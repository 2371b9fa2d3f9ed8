//! Typed error hierarchy for the BSN.cloud API client.
//!
//! `ApiError` covers every failure the collaborator layer (token endpoint,
//! REST API, file downloads) can produce. The core components
//! (`resolver`, `gate`, `executor`) wrap it in their own error enums so a
//! caller can tell *where* in the workflow something broke as well as *what*
//! broke.
//!
//! - `Auth` covers the OAuth2 token endpoint.
//! - `Api` covers non-success statuses from the REST API and keeps the
//!   response body, which carries the server's diagnostic message.
//! - `Network` wraps `reqwest::Error` for transport failures (DNS, TLS,
//!   request timeout) that never produced a status code.
//! - `Parse` wraps `serde_json::Error` for unexpected response shapes.
//! - `Io` covers writing downloaded files to local disk.

use std::path::PathBuf;

use reqwest::StatusCode;

/// Unified error type for all API client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Authentication failure at the token endpoint.
    ///
    /// Non-2xx responses (bad client id or secret, disabled application)
    /// keep the endpoint's error body in `message`.
    #[error("authentication failed: {message}")]
    Auth {
        /// Human-readable description including status and body when available.
        message: String,
        /// The underlying transport or parse error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The REST API returned a non-success HTTP status code.
    #[error("API error {status}: {body}")]
    Api {
        /// The HTTP status code returned by the API.
        status: StatusCode,
        /// The raw response body text, or an empty string if it could not be read.
        body: String,
    },

    /// JSON deserialization failed when parsing an API response body.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A network-level failure occurred (DNS resolution, TCP connection,
    /// TLS handshake, request timeout, etc.).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Writing downloaded content to the local filesystem failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Returns `true` when the API answered 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Convenience alias used throughout the client modules.
pub type Result<T> = std::result::Result<T, ApiError>;

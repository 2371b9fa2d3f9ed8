//! Authenticated HTTP client for the BSN.cloud REST API.
//!
//! `BsnClient` wraps a `reqwest::Client` and a `TokenProvider` behind a
//! `Mutex`, providing JSON request helpers (`get`, `post`, `put`, `patch`,
//! `delete`) and a raw byte download for pre-signed content URLs.
//!
//! Token lifecycle:
//! - Lazy acquisition: the first request that finds no cached token triggers
//!   `refresh_token()` via `bearer_token()`.
//! - Expiry-aware: `TokenProvider::token()` returns `None` once the cached
//!   token is inside its expiry buffer.
//! - One-shot 401 retry: a `401 Unauthorized` invalidates the cached token,
//!   refreshes once and retries the request exactly once. A second 401 is a
//!   hard failure.
//!
//! The session's active network is held server-side against the token
//! (see [`crate::networks::bind_network`]), so no request here carries a
//! network id.

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::auth::TokenProvider;
use crate::error::{ApiError, Result};

/// Default REST root for BSN.cloud.
pub const DEFAULT_BASE_URL: &str = "https://api.bsn.cloud/2022/06/REST/";

/// Connect timeout covers TCP + TLS handshake only.
const API_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout when the caller does not supply one. Generous
/// enough for multi-hundred-megabyte video downloads.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Query parameters as passed to `reqwest::RequestBuilder::query`.
pub type Query<'a> = [(&'a str, &'a str)];

fn build_api_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .connect_timeout(API_CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()?)
}

/// Authenticated HTTP client for the BSN.cloud REST API.
///
/// `auth` sits behind a `Mutex` because `refresh_token()` needs `&mut self`
/// while API methods only need `&self`. The lock is held for the token
/// check/refresh only, never across an API round-trip.
pub struct BsnClient {
    client: Client,
    base_url: String,
    auth: Mutex<TokenProvider>,
}

impl BsnClient {
    pub fn new(auth: TokenProvider, timeout: Duration) -> Result<Self> {
        Self::with_base_url(auth, DEFAULT_BASE_URL, timeout)
    }

    /// Constructor with a custom base URL. `base_url` must end with `/`;
    /// tests point it at a local mock server.
    pub fn with_base_url(auth: TokenProvider, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(BsnClient {
            client: build_api_client(timeout)?,
            base_url: base_url.to_string(),
            auth: Mutex::new(auth),
        })
    }

    async fn bearer_token(&self) -> Result<String> {
        let mut auth = self.auth.lock().await;
        if auth.token().is_none() {
            auth.refresh_token().await?;
        }

        auth.token().map(str::to_owned).ok_or_else(|| ApiError::Auth {
            message: "token missing after refresh".to_string(),
            source: None,
        })
    }

    async fn force_refresh(&self) -> Result<String> {
        let mut auth = self.auth.lock().await;
        auth.invalidate();
        auth.refresh_token().await?;

        auth.token().map(str::to_owned).ok_or_else(|| ApiError::Auth {
            message: "token missing after forced refresh".to_string(),
            source: None,
        })
    }

    /// Core request path shared by every verb helper.
    ///
    /// Returns the successful response untouched so callers decide whether
    /// to decode JSON or discard an empty body. Non-success statuses become
    /// `ApiError::Api` with the body preserved.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query<'_>>,
        body: Option<&B>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);

        let token = self.bearer_token().await?;
        let mut resp = self
            .build_request(method.clone(), &url, &token, query, body)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(%url, "received 401, refreshing token and retrying once");
            let fresh_token = self.force_refresh().await?;
            resp = self
                .build_request(method, &url, &fresh_token, query, body)
                .send()
                .await?;
        }

        check_status(resp).await
    }

    fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        token: &str,
        query: Option<&Query<'_>>,
        body: Option<&B>,
    ) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method, url).bearer_auth(token);
        if let Some(params) = query {
            req = req.query(params);
        }
        if let Some(payload) = body {
            req = req.json(payload);
        }
        req
    }

    /// Sends an authenticated GET request and deserializes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.send::<()>(Method::GET, path, None, None).await?;
        decode(resp).await
    }

    /// GET with query parameters (e.g. the opaque `filter` expression).
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T> {
        let resp = self.send::<()>(Method::GET, path, Some(query), None).await?;
        decode(resp).await
    }

    /// Sends an authenticated POST request with a JSON body and deserializes
    /// the response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self.send(Method::POST, path, None, Some(body)).await?;
        decode(resp).await
    }

    /// Sends an authenticated PUT request; the response body is discarded.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send(Method::PUT, path, None, Some(body)).await?;
        Ok(())
    }

    /// Sends an authenticated PATCH request; the response body is discarded.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send(Method::PATCH, path, None, Some(body)).await?;
        Ok(())
    }

    /// Deletes a single resource. Any 2xx (usually 204) is success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, path, None, None).await?;
        Ok(())
    }

    /// Deletes every resource matching a query and decodes the per-item
    /// result the API returns for bulk deletes.
    pub async fn delete_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T> {
        let resp = self
            .send::<()>(Method::DELETE, path, Some(query), None)
            .await?;
        decode(resp).await
    }

    /// Downloads raw bytes from a pre-signed URL without bearer auth.
    ///
    /// Content download links carry their own signature in the query string,
    /// so they are not subject to the 401 retry path.
    pub async fn download(&self, url: &str) -> Result<bytes::Bytes> {
        let resp = check_status(self.client.get(url).send().await?).await?;
        Ok(resp.bytes().await?)
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Api { status, body })
}

/// Reads the body as text first so a shape mismatch surfaces as
/// `ApiError::Parse` rather than an opaque transport error.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let text = resp.text().await?;
    Ok(serde_json::from_str(&text)?)
}

//! Network (tenant) endpoints for the BSN.cloud API.
//!
//! | Function | API Path |
//! |----------|----------|
//! | [`list_networks`] | GET `Self/Networks` |
//! | [`bind_network`] | PUT `Self/Session/Network` |
//!
//! Every device and content call is scoped to the network bound to the
//! current session token, so a tool must bind exactly one network before
//! doing anything else. The choice of *which* network lives in
//! [`crate::resolver`]; this module only talks to the API.

use serde::{Deserialize, Serialize};

use crate::client::BsnClient;

/// A network the authenticated principal can access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCandidate {
    /// Numeric network id.
    pub id: u64,
    /// Display name; unique per account but matched case-insensitively.
    pub name: String,
}

/// Paged collection wrapper returned by list endpoints.
///
/// Only `items` is required; paging markers are surfaced so callers can see
/// a truncated result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub next_marker: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BindNetworkRequest {
    id: u64,
}

/// Source of network candidates plus the "set active network" call.
///
/// The resolver is generic over this so tests can run it without HTTP.
#[allow(async_fn_in_trait)]
pub trait NetworkDirectory {
    /// Lists networks in presentation order.
    async fn list_networks(&self) -> crate::error::Result<Vec<NetworkCandidate>>;

    /// Binds the session to the network with `id`.
    async fn bind_network(&self, id: u64) -> crate::error::Result<()>;
}

/// Lists the networks the session's credentials can access, following
/// paging markers so later pages are matched and offered too.
pub async fn list_networks(client: &BsnClient) -> crate::error::Result<Vec<NetworkCandidate>> {
    let mut networks = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let page: PagedList<NetworkCandidate> = match marker.as_deref() {
            Some(m) => client.get_with_query("Self/Networks", &[("marker", m)]).await?,
            None => client.get("Self/Networks").await?,
        };
        networks.extend(page.items);

        match page.next_marker {
            Some(next) if page.is_truncated => {
                tracing::debug!(fetched = networks.len(), "network list continues on next page");
                marker = Some(next);
            }
            _ => break,
        }
    }

    Ok(networks)
}

/// Binds the session token to network `id`; later calls are scoped to it.
pub async fn bind_network(client: &BsnClient, id: u64) -> crate::error::Result<()> {
    client
        .put("Self/Session/Network", &BindNetworkRequest { id })
        .await
}

impl NetworkDirectory for BsnClient {
    async fn list_networks(&self) -> crate::error::Result<Vec<NetworkCandidate>> {
        list_networks(self).await
    }

    async fn bind_network(&self, id: u64) -> crate::error::Result<()> {
        bind_network(self, id).await
    }
}

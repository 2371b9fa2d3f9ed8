//! Content library endpoints for the BSN.cloud API.
//!
//! Content files are the media (video, images, HTML packages) stored in a
//! network's library and referenced by presentations.
//!
//! | Function | API Path |
//! |----------|----------|
//! | [`list_content`] | GET `Content?filter=..&marker=..` |
//! | [`get_content`] | GET `Content/{id}` |
//! | [`delete_content`] | DELETE `Content?ids=..` |
//! | [`download_link`] | GET `Content/{id}/DownloadUrl` |
//!
//! `filter` expressions are passed to the API untouched; this module does
//! not interpret them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::BsnClient;
use crate::error::ApiError;
use crate::executor::{ItemRef, PreviewItem};
use crate::networks::PagedList;

// ── Response types ──────────────────────────────────────────────────────

/// A file in the network's content library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFile {
    pub id: u64,

    /// File name as uploaded (e.g. `"lobby-loop.mp4"`).
    pub name: String,

    /// Folder path inside the library (e.g. `"/Lobby/"`).
    #[serde(default)]
    pub virtual_path: Option<String>,

    /// Media classification: `Video`, `Image`, `Audio`, `Html5`, ...
    #[serde(default)]
    pub media_type: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub file_size: u64,

    #[serde(default)]
    pub file_hash: Option<String>,

    #[serde(default)]
    pub upload_date: Option<String>,
}

impl PreviewItem for ContentFile {
    fn item_ref(&self) -> ItemRef {
        ItemRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Per-id result of a bulk delete.
///
/// The call itself succeeds even when some ids could not be removed; those
/// are listed in `failed` with the server's reason.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResult {
    #[serde(default)]
    pub succeeded: Vec<u64>,
    #[serde(default)]
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub id: u64,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Deserialize)]
struct DownloadLink {
    url: String,
}

// ── Endpoint functions ──────────────────────────────────────────────────

/// Lists content files matching `filter`, following paging markers until
/// the API reports no more pages.
pub async fn list_content(
    client: &BsnClient,
    filter: Option<&str>,
) -> crate::error::Result<Vec<ContentFile>> {
    let mut files = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(f) = filter {
            query.push(("filter", f));
        }
        if let Some(m) = marker.as_deref() {
            query.push(("marker", m));
        }

        let page: PagedList<ContentFile> = client.get_with_query("Content", &query).await?;
        files.extend(page.items);

        match page.next_marker {
            Some(next) if page.is_truncated => marker = Some(next),
            _ => break,
        }
    }

    Ok(files)
}

/// Retrieves one content file's metadata.
pub async fn get_content(client: &BsnClient, id: u64) -> crate::error::Result<ContentFile> {
    client.get(&format!("Content/{id}")).await
}

/// Deletes the given content ids in one call.
pub async fn delete_content(
    client: &BsnClient,
    ids: &[u64],
) -> crate::error::Result<BulkDeleteResult> {
    let joined = ids
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    client
        .delete_with_query("Content", &[("ids", joined.as_str())])
        .await
}

/// Returns a short-lived pre-signed URL for the file's bytes.
pub async fn download_link(client: &BsnClient, id: u64) -> crate::error::Result<String> {
    let link: DownloadLink = client.get(&format!("Content/{id}/DownloadUrl")).await?;
    Ok(link.url)
}

/// Downloads `file` into `dir`, returning the written path.
///
/// Only the final component of the file's name is used, so a name like
/// `"../x"` cannot escape `dir`.
pub async fn download_content(
    client: &BsnClient,
    file: &ContentFile,
    dir: &Path,
) -> crate::error::Result<PathBuf> {
    let url = download_link(client, file.id).await?;
    let bytes = client.download(&url).await?;

    let target = local_path(file, dir);
    tokio::fs::write(&target, &bytes)
        .await
        .map_err(|source| ApiError::Io {
            path: target.clone(),
            source,
        })?;
    tracing::debug!(path = %target.display(), bytes = bytes.len(), "content downloaded");
    Ok(target)
}

/// Where [`download_content`] writes `file` inside `dir`.
pub fn local_path(file: &ContentFile, dir: &Path) -> PathBuf {
    dir.join(local_file_name(file))
}

fn local_file_name(file: &ContentFile) -> String {
    Path::new(&file.name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("content-{}", file.id))
}

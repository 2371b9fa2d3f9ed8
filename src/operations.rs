//! Concrete operations run through [`crate::executor::execute`].
//!
//! Each type pairs a read-only preview with the commit call it guards.
//! Bulk calls pass the API's per-id results straight into the report;
//! single-target calls go through [`ItemOutcome::from_single`].

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::client::BsnClient;
use crate::content::{self, BulkDeleteResult, ContentFile};
use crate::devices::{self, Device, DeviceSelector, DeviceSetting};
use crate::executor::{ItemOutcome, ItemRef, Operation, PreviewItem};
use crate::gate::PendingAction;

/// Confirmation flags shared by every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmPolicy {
    /// `--yes` / `--force`.
    pub force_bypass: bool,
    /// `--json`.
    pub non_interactive: bool,
}

impl ConfirmPolicy {
    fn pending(self, description: String, item_count: usize) -> PendingAction {
        PendingAction {
            description,
            item_count,
            force_bypass: self.force_bypass,
            non_interactive: self.non_interactive,
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ── Content ────────────────────────────────────────────────────────────

/// Deletes every content file matching a filter.
pub struct DeleteContent<'a> {
    pub client: &'a BsnClient,
    pub filter: Option<String>,
    pub policy: ConfirmPolicy,
}

impl Operation for DeleteContent<'_> {
    type Item = ContentFile;

    async fn preview(&self) -> crate::error::Result<Vec<ContentFile>> {
        content::list_content(self.client, self.filter.as_deref()).await
    }

    fn pending_action(&self, preview: &[ContentFile]) -> PendingAction {
        self.policy
            .pending(format!("Delete {}", plural(preview.len(), "content file")), preview.len())
    }

    async fn commit(&self, preview: &[ContentFile]) -> crate::error::Result<Vec<ItemOutcome>> {
        let ids: Vec<u64> = preview.iter().map(|f| f.id).collect();
        let result = content::delete_content(self.client, &ids).await?;
        Ok(bulk_outcomes(preview, result))
    }
}

/// Maps a bulk delete response onto the previewed files. Every previewed
/// id gets exactly one outcome; ids the response leaves out are failures.
fn bulk_outcomes(preview: &[ContentFile], result: BulkDeleteResult) -> Vec<ItemOutcome> {
    let names: HashMap<u64, &str> = preview.iter().map(|f| (f.id, f.name.as_str())).collect();
    let item = |id: u64| ItemRef {
        id,
        name: names
            .get(&id)
            .map_or_else(|| format!("content {id}"), |n| n.to_string()),
    };

    let mut reported = HashSet::new();
    let mut outcomes = Vec::with_capacity(preview.len());
    for id in result.succeeded {
        if reported.insert(id) {
            outcomes.push(ItemOutcome::Succeeded { id });
        }
    }
    for failure in result.failed {
        if reported.insert(failure.id) {
            outcomes.push(ItemOutcome::Failed {
                item: item(failure.id),
                message: failure.error,
            });
        }
    }

    let missing: Vec<u64> = preview
        .iter()
        .map(|f| f.id)
        .filter(|id| !reported.contains(id))
        .collect();
    if !missing.is_empty() {
        tracing::warn!(?missing, "bulk delete response omitted some requested ids");
    }
    outcomes.extend(missing.into_iter().map(|id| ItemOutcome::Failed {
        item: item(id),
        message: "not reported by API".to_string(),
    }));
    outcomes
}

/// Downloads every content file matching a filter into a local directory.
///
/// Nothing remote changes, so the gate only asks when local files would
/// be overwritten.
pub struct DownloadContent<'a> {
    pub client: &'a BsnClient,
    pub filter: Option<String>,
    pub output_dir: PathBuf,
    pub policy: ConfirmPolicy,
}

impl Operation for DownloadContent<'_> {
    type Item = ContentFile;

    async fn preview(&self) -> crate::error::Result<Vec<ContentFile>> {
        content::list_content(self.client, self.filter.as_deref()).await
    }

    fn pending_action(&self, preview: &[ContentFile]) -> PendingAction {
        let existing = preview
            .iter()
            .filter(|f| content::local_path(f, &self.output_dir).exists())
            .count();
        let mut pending = self.policy.pending(
            format!(
                "Overwrite {} in {}",
                plural(existing, "existing file"),
                self.output_dir.display()
            ),
            existing,
        );
        if existing == 0 {
            pending.force_bypass = true;
        }
        pending
    }

    async fn commit(&self, preview: &[ContentFile]) -> crate::error::Result<Vec<ItemOutcome>> {
        let mut outcomes = Vec::with_capacity(preview.len());
        for file in preview {
            // One failed download must not stop the rest of the batch.
            match content::download_content(self.client, file, &self.output_dir).await {
                Ok(_) => outcomes.push(ItemOutcome::Succeeded { id: file.id }),
                Err(e) => {
                    tracing::warn!(file = %file.name, error = %e, "download failed");
                    outcomes.push(ItemOutcome::Failed {
                        item: file.item_ref(),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(outcomes)
    }
}

// ── Devices ────────────────────────────────────────────────────────────

async fn preview_device(
    client: &BsnClient,
    selector: &DeviceSelector,
) -> crate::error::Result<Vec<Device>> {
    Ok(devices::find_device(client, selector).await?.into_iter().collect())
}

/// Removes one device from the network.
pub struct DeleteDevice<'a> {
    pub client: &'a BsnClient,
    pub selector: DeviceSelector,
    pub policy: ConfirmPolicy,
}

impl Operation for DeleteDevice<'_> {
    type Item = Device;

    async fn preview(&self) -> crate::error::Result<Vec<Device>> {
        preview_device(self.client, &self.selector).await
    }

    fn pending_action(&self, preview: &[Device]) -> PendingAction {
        let target = preview
            .first()
            .map_or_else(|| self.selector.to_string(), |d| d.item_ref().name);
        self.policy.pending(format!("Delete device {target}"), preview.len())
    }

    async fn commit(&self, preview: &[Device]) -> crate::error::Result<Vec<ItemOutcome>> {
        let mut outcomes = Vec::with_capacity(preview.len());
        for device in preview {
            let result = devices::delete_device(self.client, device.id).await;
            outcomes.push(ItemOutcome::from_single(device.item_ref(), result)?);
        }
        Ok(outcomes)
    }
}

/// Turns one boolean device setting on or off.
pub struct ToggleDeviceSetting<'a> {
    pub client: &'a BsnClient,
    pub selector: DeviceSelector,
    pub setting: DeviceSetting,
    pub enabled: bool,
    pub policy: ConfirmPolicy,
}

impl Operation for ToggleDeviceSetting<'_> {
    type Item = Device;

    async fn preview(&self) -> crate::error::Result<Vec<Device>> {
        preview_device(self.client, &self.selector).await
    }

    fn pending_action(&self, preview: &[Device]) -> PendingAction {
        let target = preview
            .first()
            .map_or_else(|| self.selector.to_string(), |d| d.item_ref().name);
        let verb = if self.enabled { "Enable" } else { "Disable" };
        self.policy.pending(
            format!("{verb} {} on device {target}", self.setting.api_key()),
            preview.len(),
        )
    }

    async fn commit(&self, preview: &[Device]) -> crate::error::Result<Vec<ItemOutcome>> {
        let mut outcomes = Vec::with_capacity(preview.len());
        for device in preview {
            let result =
                devices::update_setting(self.client, device.id, self.setting, self.enabled).await;
            outcomes.push(ItemOutcome::from_single(device.item_ref(), result)?);
        }
        Ok(outcomes)
    }
}

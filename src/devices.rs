//! Device (player) endpoints for the BSN.cloud API.
//!
//! | Function | API Path |
//! |----------|----------|
//! | [`find_device`] | GET `Devices/{id}` or GET `Devices?filter=serial eq '..'` |
//! | [`delete_device`] | DELETE `Devices/{id}` |
//! | [`list_device_operations`] | GET `Devices/{id}/Operations` |
//! | [`run_diagnostic`] | POST `Devices/{id}/Diagnostics` |
//! | [`update_setting`] | PATCH `Devices/{id}/Settings` |
//!
//! Devices are addressed by numeric id in every path. Tools also accept a
//! serial number; [`find_device`] turns either form into a [`Device`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::BsnClient;
use crate::executor::{ItemRef, PreviewItem};
use crate::networks::PagedList;

// ── Response types ─────────────────────────────────────────────────────

/// A registered player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: u64,

    /// Hardware serial number (e.g. `"XTD4AB001234"`).
    pub serial: String,

    /// Display name configured for the player.
    #[serde(default)]
    pub name: Option<String>,

    /// Hardware model (e.g. `"XT1144"`).
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub family: Option<String>,

    #[serde(default)]
    pub firmware_version: Option<String>,

    /// `Normal`, `Warning`, `Error` or `Unknown`.
    #[serde(default)]
    pub health_status: Option<String>,

    /// ISO 8601 timestamp of the last check-in.
    #[serde(default)]
    pub last_seen: Option<String>,

    /// Raw settings object as returned by the API. Boolean toggles are
    /// read from here by [`DeviceSetting::current_value`].
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl Device {
    /// The configured name, or the serial when no name is set.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.serial)
    }
}

impl PreviewItem for Device {
    fn item_ref(&self) -> ItemRef {
        ItemRef {
            id: self.id,
            name: format!("{} ({})", self.display_name(), self.serial),
        }
    }
}

/// A queued or finished remote operation on a device (reboot, firmware
/// update, diagnostic run, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOperation {
    pub id: String,
    #[serde(rename = "type")]
    pub operation_type: String,
    /// `Pending`, `InProgress`, `Completed`, `Failed`, ...
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Remote diagnostic suites a player can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    Network,
    Storage,
    Time,
}

/// Output of one remote diagnostic run. `results` is tool-specific and is
/// rendered as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub kind: DiagnosticKind,
    pub status: String,
    #[serde(default)]
    pub results: serde_json::Value,
}

// ── Request types ──────────────────────────────────────────────────────

/// How a tool identifies its target device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    Serial(String),
    Id(u64),
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSelector::Serial(serial) => write!(f, "serial {serial}"),
            DeviceSelector::Id(id) => write!(f, "id {id}"),
        }
    }
}

/// Boolean device settings that tools may toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSetting {
    /// Remote diagnostic web server on the player.
    DiagnosticWebServer,
    /// Local web server used for on-site configuration.
    LocalWebServer,
    /// Periodic remote screenshots.
    RemoteSnapshot,
    /// Remote log upload.
    LogUpload,
}

impl DeviceSetting {
    /// Field name in the API's settings object.
    pub fn api_key(self) -> &'static str {
        match self {
            DeviceSetting::DiagnosticWebServer => "dwsEnabled",
            DeviceSetting::LocalWebServer => "lwsEnabled",
            DeviceSetting::RemoteSnapshot => "remoteSnapshotEnabled",
            DeviceSetting::LogUpload => "logUploadEnabled",
        }
    }

    /// Current value on `device`, if the API reported one.
    pub fn current_value(self, device: &Device) -> Option<bool> {
        device.settings.get(self.api_key()).and_then(serde_json::Value::as_bool)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticRequest {
    #[serde(rename = "type")]
    kind: DiagnosticKind,
}

// ── Endpoint functions ─────────────────────────────────────────────────

/// Looks up one device. Returns `Ok(None)` when no device matches.
pub async fn find_device(
    client: &BsnClient,
    selector: &DeviceSelector,
) -> crate::error::Result<Option<Device>> {
    match selector {
        DeviceSelector::Id(id) => match client.get::<Device>(&format!("Devices/{id}")).await {
            Ok(device) => Ok(Some(device)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        },
        DeviceSelector::Serial(serial) => {
            let filter = serial_filter(serial);
            let page: PagedList<Device> = client
                .get_with_query("Devices", &[("filter", filter.as_str())])
                .await?;
            let wanted = serial.to_lowercase();
            Ok(page
                .items
                .into_iter()
                .find(|d| d.serial.to_lowercase() == wanted))
        }
    }
}

/// Removes a device from the network.
pub async fn delete_device(client: &BsnClient, id: u64) -> crate::error::Result<()> {
    client.delete(&format!("Devices/{id}")).await
}

/// Lists the device's remote operations, most recent first as returned.
pub async fn list_device_operations(
    client: &BsnClient,
    id: u64,
) -> crate::error::Result<Vec<DeviceOperation>> {
    let page: PagedList<DeviceOperation> = client.get(&format!("Devices/{id}/Operations")).await?;
    Ok(page.items)
}

/// Runs a remote diagnostic on the device and waits for its report.
pub async fn run_diagnostic(
    client: &BsnClient,
    id: u64,
    kind: DiagnosticKind,
) -> crate::error::Result<DiagnosticReport> {
    client
        .post(&format!("Devices/{id}/Diagnostics"), &DiagnosticRequest { kind })
        .await
}

/// Sets one boolean setting on the device.
pub async fn update_setting(
    client: &BsnClient,
    id: u64,
    setting: DeviceSetting,
    enabled: bool,
) -> crate::error::Result<()> {
    let mut body = serde_json::Map::new();
    body.insert(setting.api_key().to_string(), serde_json::Value::Bool(enabled));
    client.patch(&format!("Devices/{id}/Settings"), &body).await
}

fn serial_filter(serial: &str) -> String {
    // Single quotes are doubled inside OData-style string literals.
    format!("serial eq '{}'", serial.replace('\'', "''"))
}

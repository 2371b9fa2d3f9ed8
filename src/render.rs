//! Text and JSON presentation for the tools.
//!
//! Text renderers return a `String` so tests can assert on the exact
//! output; the binaries print it. JSON output is a stable summary shape,
//! not the raw API payload.

use std::fmt::Write as _;

use serde::Serialize;

use crate::content::ContentFile;
use crate::devices::{Device, DeviceOperation, DiagnosticReport};
use crate::executor::{ExecutionReport, ExecutionStatus, ItemRef, PreviewItem};
use crate::networks::NetworkCandidate;
use crate::resolver::ActiveNetwork;

/// Pretty-printed JSON for stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Human-readable byte count (`1.5 MiB`).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

pub fn networks_text(networks: &[NetworkCandidate], active: Option<&ActiveNetwork>) -> String {
    let mut out = String::new();
    for network in networks {
        let marker = if active.is_some_and(|a| a.id == network.id) { "*" } else { " " };
        let _ = writeln!(out, "{marker} {:>8}  {}", network.id, network.name);
    }
    out
}

pub fn content_text(files: &[ContentFile]) -> String {
    let mut out = String::new();
    for file in files {
        let _ = writeln!(
            out,
            "{:>8}  {:>10}  {:<6}  {}{}",
            file.id,
            human_size(file.file_size),
            file.media_type.as_deref().unwrap_or("-"),
            file.virtual_path.as_deref().unwrap_or(""),
            file.name
        );
    }
    out
}

pub fn device_text(device: &Device) -> String {
    let mut out = String::new();
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "Name:      {}", device.display_name());
    let _ = writeln!(out, "ID:        {}", device.id);
    let _ = writeln!(out, "Serial:    {}", device.serial);
    let _ = writeln!(out, "Model:     {}", field(&device.model));
    let _ = writeln!(out, "Family:    {}", field(&device.family));
    let _ = writeln!(out, "Firmware:  {}", field(&device.firmware_version));
    let _ = writeln!(out, "Health:    {}", field(&device.health_status));
    let _ = writeln!(out, "Last seen: {}", field(&device.last_seen));
    out
}

pub fn operations_text(operations: &[DeviceOperation]) -> String {
    if operations.is_empty() {
        return "No operations recorded for this device.\n".to_string();
    }
    let mut out = String::new();
    for op in operations {
        let _ = write!(
            out,
            "{}  {:<20} {:<11} {}",
            op.id,
            op.operation_type,
            op.status,
            op.created_at.as_deref().unwrap_or("-")
        );
        if let Some(message) = &op.message {
            let _ = write!(out, "  {message}");
        }
        out.push('\n');
    }
    out
}

pub fn diagnostic_text(report: &DiagnosticReport) -> String {
    let results = serde_json::to_string_pretty(&report.results).unwrap_or_default();
    format!("{:?} diagnostic: {}\n{results}\n", report.kind, report.status)
}

/// Summary of an execution report for text output.
///
/// `verb` is the past tense shown for committed items ("deleted").
pub fn report_text<I: PreviewItem>(report: &ExecutionReport<I>, verb: &str) -> String {
    let mut out = String::new();
    match report.status {
        ExecutionStatus::NothingMatched => out.push_str("Nothing matched; no changes made.\n"),
        ExecutionStatus::DryRun => {
            let _ = writeln!(out, "Dry run: {} item(s) would be {verb}:", report.preview.len());
            for item in &report.preview {
                let r = item.item_ref();
                let _ = writeln!(out, "  {}  {}", r.id, r.name);
            }
        }
        ExecutionStatus::Cancelled => out.push_str("Cancelled; no changes made.\n"),
        ExecutionStatus::Committed => {
            let succeeded = report.succeeded_ids().len();
            let _ = writeln!(out, "{succeeded} of {} item(s) {verb}.", report.attempted_count());
            for (item, message) in report.failures() {
                let _ = writeln!(out, "  failed: {} {}: {message}", item.id, item.name);
            }
        }
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureEntry<'a> {
    item: &'a ItemRef,
    message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportSummary<'a, I> {
    status: ExecutionStatus,
    preview: &'a [I],
    attempted_count: usize,
    succeeded_ids: Vec<u64>,
    failures: Vec<FailureEntry<'a>>,
}

/// Machine-readable summary of an execution report.
pub fn report_json<I: Serialize>(report: &ExecutionReport<I>) -> Result<String, serde_json::Error> {
    let summary = ReportSummary {
        status: report.status,
        preview: &report.preview,
        attempted_count: report.attempted_count(),
        succeeded_ids: report.succeeded_ids().into_iter().collect(),
        failures: report
            .failures()
            .map(|(item, message)| FailureEntry { item, message })
            .collect(),
    };
    json(&summary)
}

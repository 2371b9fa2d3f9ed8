//! Preview → dry-run → confirm → commit → report workflow.
//!
//! An [`Operation`] supplies a read-only preview and a commit step. The
//! executor runs them strictly in order:
//!
//! ```text
//! Previewing ─┬─ empty ──────────────────────────────► NothingMatched
//!             └─ items ─┬─ dry run ──────────────────► DryRun
//!                       └─ gate ─┬─ cancelled ──────► Cancelled
//!                                └─ proceed ─ commit ► Committed
//! ```
//!
//! Only `Committed` reports carry outcomes. Errors raised by the preview or
//! commit call itself are fatal; per-item problems reported by a commit
//! that otherwise succeeded are kept in the report as
//! [`ItemOutcome::Failed`] entries.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::console::Console;
use crate::error::ApiError;
use crate::gate::{self, Decision, GateError, PendingAction};

/// Identity of an item in a preview or a failure entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRef {
    pub id: u64,
    pub name: String,
}

/// Anything an operation can list in its preview.
pub trait PreviewItem {
    fn item_ref(&self) -> ItemRef;
}

/// Result of committing one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum ItemOutcome {
    Succeeded { id: u64 },
    Failed { item: ItemRef, message: String },
}

impl ItemOutcome {
    /// Normalizes the void result of a single-target call into one outcome.
    ///
    /// A status the API answered with (404, 409, ...) is a per-item failure.
    /// Anything that never reached a verdict (transport, auth, parse) is
    /// returned as `Err` and aborts the commit.
    pub fn from_single(item: ItemRef, result: crate::error::Result<()>) -> crate::error::Result<Self> {
        match result {
            Ok(()) => Ok(ItemOutcome::Succeeded { id: item.id }),
            Err(ApiError::Api { status, body }) => {
                let message = if body.trim().is_empty() {
                    status.to_string()
                } else {
                    format!("{status}: {}", body.trim())
                };
                Ok(ItemOutcome::Failed { item, message })
            }
            Err(other) => Err(other),
        }
    }
}

/// How the workflow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionStatus {
    /// The preview was empty; nothing was gated or committed.
    NothingMatched,
    /// `--dry-run`: the preview is kept for display, nothing committed.
    DryRun,
    /// The operator declined at the confirmation prompt.
    Cancelled,
    /// The commit step ran; see the outcomes.
    Committed,
}

/// Everything the presenter needs after one execution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport<I> {
    pub status: ExecutionStatus,
    pub preview: Vec<I>,
    outcomes: Vec<ItemOutcome>,
}

impl<I> ExecutionReport<I> {
    fn finished(status: ExecutionStatus, preview: Vec<I>) -> Self {
        ExecutionReport {
            status,
            preview,
            outcomes: Vec::new(),
        }
    }

    /// Number of items the commit step acted on. Always equals
    /// `succeeded_ids().len() + failures().count()`.
    pub fn attempted_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    pub fn succeeded_ids(&self) -> BTreeSet<u64> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ItemOutcome::Succeeded { id } => Some(*id),
                ItemOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// Failed items in the order the commit reported them.
    pub fn failures(&self) -> impl Iterator<Item = (&ItemRef, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            ItemOutcome::Failed { item, message } => Some((item, message.as_str())),
            ItemOutcome::Succeeded { .. } => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// A previewable, confirmable remote mutation.
#[allow(async_fn_in_trait)]
pub trait Operation {
    type Item: PreviewItem;

    /// Lists the items the commit would touch. Must not mutate remote state.
    async fn preview(&self) -> crate::error::Result<Vec<Self::Item>>;

    /// Describes the commit for the confirmation gate.
    fn pending_action(&self, preview: &[Self::Item]) -> PendingAction;

    /// Performs the mutation for the previewed items.
    async fn commit(&self, preview: &[Self::Item]) -> crate::error::Result<Vec<ItemOutcome>>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("preview failed: {0}")]
    PreviewFailed(#[source] ApiError),

    #[error("commit failed: {0}")]
    CommitFailed(#[source] ApiError),

    #[error(transparent)]
    Gate(#[from] GateError),
}

/// Runs `op` through the workflow.
pub async fn execute<O, C>(
    op: &O,
    dry_run: bool,
    console: &mut C,
) -> Result<ExecutionReport<O::Item>, ExecutorError>
where
    O: Operation,
    C: Console,
{
    let preview = op.preview().await.map_err(ExecutorError::PreviewFailed)?;
    tracing::debug!(items = preview.len(), "preview complete");

    if preview.is_empty() {
        return Ok(ExecutionReport::finished(ExecutionStatus::NothingMatched, preview));
    }

    if dry_run {
        tracing::info!(items = preview.len(), "dry run, skipping commit");
        return Ok(ExecutionReport::finished(ExecutionStatus::DryRun, preview));
    }

    let pending = op.pending_action(&preview);
    if gate::confirm(&pending, console)? == Decision::Cancelled {
        tracing::info!(action = %pending.description, "cancelled by operator");
        return Ok(ExecutionReport::finished(ExecutionStatus::Cancelled, preview));
    }

    let outcomes = op
        .commit(&preview)
        .await
        .map_err(ExecutorError::CommitFailed)?;
    let report = ExecutionReport {
        status: ExecutionStatus::Committed,
        preview,
        outcomes,
    };
    tracing::info!(
        attempted = report.attempted_count(),
        succeeded = report.succeeded_ids().len(),
        "commit complete"
    );
    Ok(report)
}

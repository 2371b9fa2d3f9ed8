//! Yes/no confirmation in front of destructive or mutating actions.

use serde::Serialize;

use crate::console::Console;

/// One action waiting for the operator's consent.
#[derive(Debug, Clone, Serialize)]
pub struct PendingAction {
    /// What will happen, e.g. "Delete 3 content files".
    pub description: String,
    /// How many remote items the action touches.
    pub item_count: usize,
    /// `--yes` / `--force`: skip the prompt.
    pub force_bypass: bool,
    /// Machine-readable output mode (`--json`). Does not imply consent.
    pub non_interactive: bool,
}

/// The operator's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("confirmation required but no console input is available; pass --yes to proceed")]
    InputUnavailable,

    #[error("{description}: machine-readable mode does not prompt; pass --yes to confirm")]
    BypassRequired { description: String },
}

/// Asks the operator to confirm `action`.
///
/// Only an answer of `y` or `yes` (any case, surrounding whitespace
/// ignored) proceeds; anything else, including an empty line, cancels.
pub fn confirm<C: Console>(action: &PendingAction, console: &mut C) -> Result<Decision, GateError> {
    if action.force_bypass {
        tracing::debug!(action = %action.description, "confirmation bypassed by flag");
        return Ok(Decision::Proceed);
    }

    if action.non_interactive {
        return Err(GateError::BypassRequired {
            description: action.description.clone(),
        });
    }

    console.say(&format!(
        "{} ({} item{})",
        action.description,
        action.item_count,
        if action.item_count == 1 { "" } else { "s" }
    ));
    let answer = console
        .ask("Are you sure? [y/N]: ")
        .ok()
        .flatten()
        .ok_or(GateError::InputUnavailable)?;

    let decision = match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Decision::Proceed,
        _ => Decision::Cancelled,
    };
    tracing::debug!(?decision, "operator answered confirmation prompt");
    Ok(decision)
}

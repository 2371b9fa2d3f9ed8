//! Chooses the single network a tool invocation operates in.
//!
//! Rules, first match wins:
//!
//! 1. A network already bound in the caller's session slot is returned as is.
//! 2. An empty explicit name falls back to the environment default.
//! 3. No candidates at all is fatal.
//! 4. A requested name is matched case-insensitively. When nothing matches
//!    the operator is shown the name and the candidates, and resolution
//!    continues with rule 5.
//! 5. A single candidate is selected without asking.
//! 6. Otherwise the operator picks a 1-based index from the list.
//!
//! The session slot is only written after the API accepted the bind.

use std::fmt;

use serde::Serialize;

use crate::console::Console;
use crate::error::ApiError;
use crate::networks::{NetworkCandidate, NetworkDirectory};

/// The network bound to this process's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveNetwork {
    pub id: u64,
    pub name: String,
}

impl From<NetworkCandidate> for ActiveNetwork {
    fn from(candidate: NetworkCandidate) -> Self {
        ActiveNetwork {
            id: candidate.id,
            name: candidate.name,
        }
    }
}

impl fmt::Display for ActiveNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {})", self.name, self.id)
    }
}

/// What the operator asked for.
#[derive(Debug, Clone, Default)]
pub struct ResolutionRequest {
    /// `--network` value.
    pub explicit_name: Option<String>,
    /// `BSN_NETWORK` value.
    pub environment_name: Option<String>,
    /// Whether the operator may be prompted to pick from a list.
    pub interactive: bool,
}

impl ResolutionRequest {
    /// The name to match, after applying the environment fallback. Blank
    /// strings count as absent.
    pub fn effective_name(&self) -> Option<&str> {
        non_blank(&self.explicit_name).or_else(|| non_blank(&self.environment_name))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Network names compare equal ignoring case, with full Unicode folding.
fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("no networks are available to these credentials")]
    NoNetworksAvailable,

    #[error("failed to list networks: {0}")]
    ListFailed(#[source] ApiError),

    #[error("invalid network selection {input:?}: expected a number from 1 to {max}")]
    InvalidSelection { input: String, max: usize },

    #[error("a network must be chosen but no console input is available; pass --network")]
    InputUnavailable,

    #[error("failed to activate network {name} (id {id}): {source}")]
    BindFailed {
        id: u64,
        name: String,
        #[source]
        source: ApiError,
    },
}

/// Resolves and binds the active network for this session.
pub async fn resolve<D, C>(
    request: &ResolutionRequest,
    directory: &D,
    console: &mut C,
    session: &mut Option<ActiveNetwork>,
) -> Result<ActiveNetwork, ResolutionError>
where
    D: NetworkDirectory,
    C: Console,
{
    if let Some(active) = session {
        tracing::debug!(network = %active, "network already bound for this session");
        return Ok(active.clone());
    }

    let requested = request.effective_name();

    let candidates = directory
        .list_networks()
        .await
        .map_err(ResolutionError::ListFailed)?;
    if candidates.is_empty() {
        return Err(ResolutionError::NoNetworksAvailable);
    }

    if let Some(name) = requested {
        if let Some(found) = candidates.iter().find(|c| same_name(&c.name, name)) {
            tracing::debug!(network = %found.name, "matched requested network");
            return bind(directory, found.clone(), session).await;
        }
        tracing::warn!(requested = name, "requested network not found");
        console.say(&format!("Network '{name}' was not found. Available networks:"));
        for candidate in &candidates {
            console.say(&format!("  {} (id {})", candidate.name, candidate.id));
        }
    }

    if candidates.len() == 1 {
        let only = candidates[0].clone();
        tracing::debug!(network = %only.name, "auto-selecting the only available network");
        return bind(directory, only, session).await;
    }

    let chosen = choose_interactively(&candidates, request.interactive, console)?;
    bind(directory, chosen, session).await
}

fn choose_interactively<C: Console>(
    candidates: &[NetworkCandidate],
    interactive: bool,
    console: &mut C,
) -> Result<NetworkCandidate, ResolutionError> {
    if !interactive {
        return Err(ResolutionError::InputUnavailable);
    }

    console.say("Select a network:");
    for (index, candidate) in candidates.iter().enumerate() {
        console.say(&format!("  {}) {} (id {})", index + 1, candidate.name, candidate.id));
    }

    let max = candidates.len();
    let line = console
        .ask(&format!("Network [1-{max}]: "))
        .ok()
        .flatten()
        .ok_or(ResolutionError::InputUnavailable)?;

    let input = line.trim();
    let index = input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=max).contains(n))
        .ok_or_else(|| ResolutionError::InvalidSelection {
            input: input.to_string(),
            max,
        })?;

    Ok(candidates[index - 1].clone())
}

async fn bind<D: NetworkDirectory>(
    directory: &D,
    candidate: NetworkCandidate,
    session: &mut Option<ActiveNetwork>,
) -> Result<ActiveNetwork, ResolutionError> {
    if let Err(source) = directory.bind_network(candidate.id).await {
        return Err(ResolutionError::BindFailed {
            id: candidate.id,
            name: candidate.name,
            source,
        });
    }
    let active = ActiveNetwork::from(candidate);
    tracing::info!(network = %active, "active network set");
    *session = Some(active.clone());
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use std::cell::{Cell, RefCell};

    /// In-memory directory that records what was asked of it.
    struct FakeDirectory {
        networks: Vec<NetworkCandidate>,
        fail_bind: bool,
        list_calls: Cell<usize>,
        bound: RefCell<Vec<u64>>,
    }

    impl FakeDirectory {
        fn new(networks: &[(u64, &str)]) -> Self {
            FakeDirectory {
                networks: networks
                    .iter()
                    .map(|(id, name)| NetworkCandidate { id: *id, name: name.to_string() })
                    .collect(),
                fail_bind: false,
                list_calls: Cell::new(0),
                bound: RefCell::new(Vec::new()),
            }
        }
    }

    impl NetworkDirectory for FakeDirectory {
        async fn list_networks(&self) -> crate::error::Result<Vec<NetworkCandidate>> {
            self.list_calls.set(self.list_calls.get() + 1);
            Ok(self.networks.clone())
        }

        async fn bind_network(&self, id: u64) -> crate::error::Result<()> {
            if self.fail_bind {
                return Err(ApiError::Api {
                    status: reqwest::StatusCode::FORBIDDEN,
                    body: "no access".into(),
                });
            }
            self.bound.borrow_mut().push(id);
            Ok(())
        }
    }

    fn request(explicit: Option<&str>, env: Option<&str>) -> ResolutionRequest {
        ResolutionRequest {
            explicit_name: explicit.map(str::to_string),
            environment_name: env.map(str::to_string),
            interactive: true,
        }
    }

    #[tokio::test]
    async fn explicit_name_matches_case_insensitively() {
        let dir = FakeDirectory::new(&[(1, "Alpha"), (2, "BETA")]);
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let active = resolve(&request(Some("beta"), None), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active.id, 2);
        assert_eq!(active.name, "BETA");
        assert_eq!(*dir.bound.borrow(), vec![2]);
        assert_eq!(session, Some(active));
        assert_eq!(console.prompts(), 0);
    }

    #[tokio::test]
    async fn explicit_name_matches_non_ascii_case_insensitively() {
        let dir = FakeDirectory::new(&[(1, "Zürich Lobby"), (2, "Other")]);
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let active = resolve(&request(Some("ZÜRICH LOBBY"), None), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active.id, 1);
        assert_eq!(console.prompts(), 0);
    }

    #[test]
    fn blank_explicit_name_falls_back_to_environment() {
        let req = request(Some("   "), Some(" Lobby "));
        assert_eq!(req.effective_name(), Some("Lobby"));
        assert_eq!(request(Some(""), Some("")).effective_name(), None);
    }

    #[tokio::test]
    async fn single_candidate_is_selected_without_prompt() {
        let dir = FakeDirectory::new(&[(7, "Only")]);
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let active = resolve(&request(Some(""), None), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active.id, 7);
        assert_eq!(console.prompts(), 0);
    }

    #[tokio::test]
    async fn environment_name_is_used_when_explicit_is_blank() {
        let dir = FakeDirectory::new(&[(1, "Alpha"), (2, "Beta")]);
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let active = resolve(&request(Some("  "), Some("alpha")), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active.id, 1);
    }

    #[tokio::test]
    async fn explicit_name_wins_over_environment() {
        let dir = FakeDirectory::new(&[(1, "Alpha"), (2, "Beta")]);
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let active = resolve(&request(Some("Beta"), Some("Alpha")), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active.id, 2);
    }

    #[tokio::test]
    async fn unmatched_name_falls_through_to_single_candidate() {
        let dir = FakeDirectory::new(&[(7, "Only")]);
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let active = resolve(&request(Some("missing"), None), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active.id, 7);
        assert!(console.saw("'missing' was not found"));
        assert!(console.saw("Only (id 7)"));
    }

    #[tokio::test]
    async fn unmatched_name_falls_through_to_prompt() {
        let dir = FakeDirectory::new(&[(1, "Alpha"), (2, "Beta")]);
        let mut console = ScriptedConsole::new(["2"]);
        let mut session = None;

        let active = resolve(&request(Some("gamma"), None), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active.id, 2);
        assert_eq!(console.prompts(), 1);
        assert!(console.saw("'gamma' was not found"));
    }

    #[tokio::test]
    async fn prompt_lists_candidates_with_one_based_indices() {
        let dir = FakeDirectory::new(&[(10, "Alpha"), (20, "Beta"), (30, "Gamma")]);
        let mut console = ScriptedConsole::new([" 1 "]);
        let mut session = None;

        let active = resolve(&request(None, None), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active.id, 10);
        assert!(console.saw("1) Alpha"));
        assert!(console.saw("3) Gamma"));
        assert!(console.saw("[1-3]"));
    }

    #[tokio::test]
    async fn out_of_range_and_non_numeric_selections_are_invalid() {
        for input in ["0", "3", "-1", "two", "", "1.5"] {
            let dir = FakeDirectory::new(&[(1, "Alpha"), (2, "Beta")]);
            let mut console = ScriptedConsole::new([input]);
            let mut session = None;

            let err = resolve(&request(None, None), &dir, &mut console, &mut session)
                .await
                .unwrap_err();

            assert!(
                matches!(err, ResolutionError::InvalidSelection { max: 2, .. }),
                "input {input:?} should be rejected, got {err:?}"
            );
            assert!(session.is_none());
            assert!(dir.bound.borrow().is_empty());
        }
    }

    #[tokio::test]
    async fn end_of_input_is_input_unavailable() {
        let dir = FakeDirectory::new(&[(1, "Alpha"), (2, "Beta")]);
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let err = resolve(&request(None, None), &dir, &mut console, &mut session)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::InputUnavailable));
    }

    #[tokio::test]
    async fn non_interactive_request_never_prompts() {
        let dir = FakeDirectory::new(&[(1, "Alpha"), (2, "Beta")]);
        let mut console = ScriptedConsole::new(["1"]);
        let mut session = None;
        let mut req = request(None, None);
        req.interactive = false;

        let err = resolve(&req, &dir, &mut console, &mut session).await.unwrap_err();

        assert!(matches!(err, ResolutionError::InputUnavailable));
        assert_eq!(console.prompts(), 0);
    }

    #[tokio::test]
    async fn empty_candidate_list_is_fatal() {
        let dir = FakeDirectory::new(&[]);
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let err = resolve(&request(Some("Alpha"), None), &dir, &mut console, &mut session)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::NoNetworksAvailable));
    }

    #[tokio::test]
    async fn bound_session_short_circuits_without_lookup() {
        let dir = FakeDirectory::new(&[(1, "Alpha"), (2, "Beta")]);
        let mut console = ScriptedConsole::headless();
        let existing = ActiveNetwork { id: 99, name: "Pinned".into() };
        let mut session = Some(existing.clone());

        let active = resolve(&request(Some("Alpha"), None), &dir, &mut console, &mut session)
            .await
            .unwrap();

        assert_eq!(active, existing);
        assert_eq!(dir.list_calls.get(), 0);
        assert!(dir.bound.borrow().is_empty());
    }

    #[tokio::test]
    async fn bind_failure_leaves_session_empty() {
        let mut dir = FakeDirectory::new(&[(1, "Alpha")]);
        dir.fail_bind = true;
        let mut console = ScriptedConsole::headless();
        let mut session = None;

        let err = resolve(&request(Some("Alpha"), None), &dir, &mut console, &mut session)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::BindFailed { id: 1, .. }));
        assert!(session.is_none());
    }
}

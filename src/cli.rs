//! Flags and start-up shared by every `bsn-*` tool.
//!
//! A tool's `main` flattens the argument groups it needs into its own
//! `clap::Parser`, calls [`start`] to authenticate and resolve the network,
//! does its one operation and hands the outcome to [`finish`].
//!
//! Exit codes:
//! - 0: success, nothing matched, or the operator cancelled
//! - 1: validation, resolution or operation failure
//! - 2: argument errors (clap handles these)

use std::process::ExitCode;
use std::time::Duration;

use clap::Args;

use crate::auth::DEFAULT_TOKEN_URL;
use crate::client::{BsnClient, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::config::{
    API_URL_ENV, CLIENT_ID_ENV, CLIENT_SECRET_ENV, ClientConfig, NETWORK_ENV, TOKEN_URL_ENV,
};
use crate::console::TerminalConsole;
use crate::devices::DeviceSelector;
use crate::error::ApiError;
use crate::executor::ExecutorError;
use crate::operations::ConfirmPolicy;
use crate::resolver::{self, ActiveNetwork, ResolutionError, ResolutionRequest};

/// Connection, network and output flags.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Network to operate in. Matched case-insensitively.
    #[arg(short = 'n', long)]
    pub network: Option<String>,

    /// Default network when --network is not given.
    #[arg(long = "default-network", env = NETWORK_ENV, hide = true)]
    pub environment_network: Option<String>,

    /// API client id.
    #[arg(long, env = CLIENT_ID_ENV, hide_env_values = true)]
    pub client_id: String,

    /// API client secret. Prefer the environment variable so the secret
    /// stays out of process listings and shell history.
    #[arg(long, env = CLIENT_SECRET_ENV, hide_env_values = true)]
    pub client_secret: String,

    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_BASE_URL, hide = true)]
    pub api_url: String,

    #[arg(long, env = TOKEN_URL_ENV, default_value = DEFAULT_TOKEN_URL, hide = true)]
    pub token_url: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            token_url: self.token_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }

    /// Machine-readable mode never prompts. Otherwise stdin counts as
    /// operator input whether it is a terminal or a pipe, the same rule the
    /// confirmation gate applies.
    pub fn resolution_request(&self) -> ResolutionRequest {
        ResolutionRequest {
            explicit_name: self.network.clone(),
            environment_name: self.environment_network.clone(),
            interactive: !self.json,
        }
    }
}

/// Flags for tools that change remote state.
#[derive(Args, Debug)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", visible_alias = "force")]
    pub yes: bool,

    /// Show what would change without changing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl ConfirmArgs {
    pub fn policy(&self, common: &CommonArgs) -> ConfirmPolicy {
        ConfirmPolicy {
            force_bypass: self.yes,
            non_interactive: common.json,
        }
    }
}

/// Exactly one way of naming the target device.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct DeviceTarget {
    /// Device serial number.
    #[arg(long)]
    pub serial: Option<String>,

    /// Numeric device id.
    #[arg(long)]
    pub id: Option<u64>,
}

impl DeviceTarget {
    pub fn selector(&self) -> Result<DeviceSelector, ToolError> {
        match (&self.serial, self.id) {
            (Some(serial), None) if !serial.trim().is_empty() => {
                Ok(DeviceSelector::Serial(serial.trim().to_string()))
            }
            (None, Some(id)) => Ok(DeviceSelector::Id(id)),
            (Some(_), None) => Err(ToolError::Usage("--serial must not be empty".into())),
            _ => Err(ToolError::Usage("exactly one of --serial or --id is required".into())),
        }
    }
}

/// Everything that ends a tool with exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),
}

/// An authenticated client bound to a network, ready for one operation.
pub struct Session {
    pub client: BsnClient,
    pub network: ActiveNetwork,
    pub console: TerminalConsole,
}

/// Initialises logging, builds the client and resolves the network.
pub async fn start(common: &CommonArgs) -> Result<Session, ToolError> {
    crate::logging::init_tracing(common.verbose);

    let client = common.client_config().connect()?;
    let mut console = TerminalConsole::new();
    let request = common.resolution_request();

    let mut active = None;
    let network = resolver::resolve(&request, &client, &mut console, &mut active).await?;

    Ok(Session {
        client,
        network,
        console,
    })
}

/// Prints `output` (if any) and maps the result to an exit code.
pub fn finish(result: Result<String, ToolError>) -> ExitCode {
    match result {
        Ok(output) => {
            if !output.is_empty() {
                print!("{output}");
                if !output.ends_with('\n') {
                    println!();
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "tool failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

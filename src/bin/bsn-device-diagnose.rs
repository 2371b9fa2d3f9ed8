//! Runs a remote diagnostic on one device and prints its report.

use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use bsn_cli::cli::{self, CommonArgs, DeviceTarget, ToolError};
use bsn_cli::devices::{DiagnosticKind, find_device, run_diagnostic};
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "Run a remote diagnostic on a device", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    target: DeviceTarget,

    /// Diagnostic suite to run.
    #[arg(long, value_enum, default_value_t = Suite::Network)]
    suite: Suite,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Suite {
    Network,
    Storage,
    Time,
}

impl From<Suite> for DiagnosticKind {
    fn from(suite: Suite) -> Self {
        match suite {
            Suite::Network => DiagnosticKind::Network,
            Suite::Storage => DiagnosticKind::Storage,
            Suite::Time => DiagnosticKind::Time,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    cli::finish(run(&args).await)
}

async fn run(args: &Cli) -> Result<String, ToolError> {
    let selector = args.target.selector()?;
    let session = cli::start(&args.common).await?;

    let device = find_device(&session.client, &selector)
        .await?
        .ok_or_else(|| ToolError::NotFound(format!("no device with {selector} in {}", session.network)))?;
    let report = run_diagnostic(&session.client, device.id, args.suite.into()).await?;

    if args.common.json {
        Ok(render::json(&report)?)
    } else {
        Ok(render::diagnostic_text(&report))
    }
}

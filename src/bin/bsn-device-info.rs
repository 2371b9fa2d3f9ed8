//! Shows one device's details.

use std::process::ExitCode;

use clap::Parser;

use bsn_cli::cli::{self, CommonArgs, DeviceTarget, ToolError};
use bsn_cli::devices::find_device;
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "Show device details", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    target: DeviceTarget,
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

    if args.common.json {
        Ok(render::json(&device)?)
    } else {
        Ok(render::device_text(&device))
    }
}

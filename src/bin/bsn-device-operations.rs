//! Lists the remote operations recorded for one device.

use std::process::ExitCode;

use clap::Parser;

use bsn_cli::cli::{self, CommonArgs, DeviceTarget, ToolError};
use bsn_cli::devices::{find_device, list_device_operations};
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "List a device's remote operations", long_about = None)]
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
    let operations = list_device_operations(&session.client, device.id).await?;

    if args.common.json {
        Ok(render::json(&operations)?)
    } else {
        Ok(render::operations_text(&operations))
    }
}

//! Removes one device from the network.

use std::process::ExitCode;

use clap::Parser;

use bsn_cli::cli::{self, CommonArgs, ConfirmArgs, DeviceTarget, ToolError};
use bsn_cli::executor::execute;
use bsn_cli::operations::DeleteDevice;
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "Delete a device from the network", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    confirm: ConfirmArgs,

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
    let mut session = cli::start(&args.common).await?;

    let op = DeleteDevice {
        client: &session.client,
        selector,
        policy: args.confirm.policy(&args.common),
    };
    let report = execute(&op, args.confirm.dry_run, &mut session.console).await?;

    if args.common.json {
        Ok(render::report_json(&report)?)
    } else {
        Ok(render::report_text(&report, "deleted"))
    }
}

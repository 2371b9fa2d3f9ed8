//! Lists the networks the account can reach and marks the one this run
//! resolved to.

use std::process::ExitCode;

use clap::Parser;

use bsn_cli::cli::{self, CommonArgs, ToolError};
use bsn_cli::networks::list_networks;
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "List networks available to the account", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    cli::finish(run(&args).await)
}

async fn run(args: &Cli) -> Result<String, ToolError> {
    let session = cli::start(&args.common).await?;
    let networks = list_networks(&session.client).await?;

    if args.common.json {
        Ok(render::json(&networks)?)
    } else {
        Ok(render::networks_text(&networks, Some(&session.network)))
    }
}

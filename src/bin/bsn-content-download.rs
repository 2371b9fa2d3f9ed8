//! Downloads content files matching a filter into a local directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bsn_cli::cli::{self, CommonArgs, ConfirmArgs, ToolError};
use bsn_cli::executor::execute;
use bsn_cli::operations::DownloadContent;
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "Download content files matching a filter", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    confirm: ConfirmArgs,

    /// Filter expression passed to the API unchanged.
    #[arg(long)]
    filter: Option<String>,

    /// Directory to write files into. Must already exist.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    cli::finish(run(&args).await)
}

async fn run(args: &Cli) -> Result<String, ToolError> {
    if !args.output.is_dir() {
        return Err(ToolError::Usage(format!(
            "output directory {} does not exist",
            args.output.display()
        )));
    }

    let mut session = cli::start(&args.common).await?;
    let op = DownloadContent {
        client: &session.client,
        filter: args.filter.clone(),
        output_dir: args.output.clone(),
        policy: args.confirm.policy(&args.common),
    };
    let report = execute(&op, args.confirm.dry_run, &mut session.console).await?;

    if args.common.json {
        Ok(render::report_json(&report)?)
    } else {
        Ok(render::report_text(&report, "downloaded"))
    }
}

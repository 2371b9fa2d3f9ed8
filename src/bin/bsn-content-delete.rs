//! Deletes every content file matching a filter, after a preview and a
//! confirmation.

use std::process::ExitCode;

use clap::Parser;

use bsn_cli::cli::{self, CommonArgs, ConfirmArgs, ToolError};
use bsn_cli::executor::execute;
use bsn_cli::operations::DeleteContent;
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "Delete content files matching a filter", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    confirm: ConfirmArgs,

    /// Filter expression passed to the API unchanged. Required so a bare
    /// invocation cannot select every file.
    #[arg(long)]
    filter: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    cli::finish(run(&args).await)
}

async fn run(args: &Cli) -> Result<String, ToolError> {
    if args.filter.trim().is_empty() {
        return Err(ToolError::Usage("--filter must not be empty".into()));
    }

    let mut session = cli::start(&args.common).await?;
    let op = DeleteContent {
        client: &session.client,
        filter: Some(args.filter.clone()),
        policy: args.confirm.policy(&args.common),
    };
    let report = execute(&op, args.confirm.dry_run, &mut session.console).await?;

    if args.common.json {
        Ok(render::report_json(&report)?)
    } else {
        Ok(render::report_text(&report, "deleted"))
    }
}

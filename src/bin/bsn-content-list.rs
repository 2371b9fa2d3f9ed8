//! Lists content files in the resolved network.

use std::process::ExitCode;

use clap::Parser;

use bsn_cli::cli::{self, CommonArgs, ToolError};
use bsn_cli::content::{get_content, list_content};
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "List content files", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Filter expression passed to the API unchanged.
    #[arg(long, conflicts_with = "id")]
    filter: Option<String>,

    /// Show a single content file by id.
    #[arg(long)]
    id: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    cli::finish(run(&args).await)
}

async fn run(args: &Cli) -> Result<String, ToolError> {
    let session = cli::start(&args.common).await?;

    let files = match args.id {
        Some(id) => vec![get_content(&session.client, id).await?],
        None => list_content(&session.client, args.filter.as_deref()).await?,
    };

    if args.common.json {
        Ok(render::json(&files)?)
    } else if files.is_empty() {
        Ok("No content files matched.".to_string())
    } else {
        Ok(render::content_text(&files))
    }
}

//! Turns one boolean device setting on or off.

use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use bsn_cli::cli::{self, CommonArgs, ConfirmArgs, DeviceTarget, ToolError};
use bsn_cli::devices::DeviceSetting;
use bsn_cli::executor::execute;
use bsn_cli::operations::ToggleDeviceSetting;
use bsn_cli::render;

#[derive(Parser)]
#[command(version, about = "Enable or disable a device setting", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    confirm: ConfirmArgs,

    #[command(flatten)]
    target: DeviceTarget,

    /// Setting to change.
    #[arg(long, value_enum)]
    setting: Setting,

    #[command(flatten)]
    state: State,
}

/// Exactly one of --enable / --disable.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct State {
    #[arg(long)]
    enable: bool,

    #[arg(long)]
    disable: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Setting {
    /// Diagnostic web server.
    Dws,
    /// Local web server.
    Lws,
    /// Periodic remote snapshots.
    Snapshot,
    /// Remote log upload.
    LogUpload,
}

impl From<Setting> for DeviceSetting {
    fn from(setting: Setting) -> Self {
        match setting {
            Setting::Dws => DeviceSetting::DiagnosticWebServer,
            Setting::Lws => DeviceSetting::LocalWebServer,
            Setting::Snapshot => DeviceSetting::RemoteSnapshot,
            Setting::LogUpload => DeviceSetting::LogUpload,
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
    let mut session = cli::start(&args.common).await?;

    let op = ToggleDeviceSetting {
        client: &session.client,
        selector,
        setting: args.setting.into(),
        enabled: args.state.enable,
        policy: args.confirm.policy(&args.common),
    };
    let report = execute(&op, args.confirm.dry_run, &mut session.console).await?;

    let verb = if args.state.enable { "updated (enabled)" } else { "updated (disabled)" };
    if args.common.json {
        Ok(render::report_json(&report)?)
    } else {
        Ok(render::report_text(&report, verb))
    }
}

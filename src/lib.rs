//! Command-line tools for a BSN.cloud account: networks, content files and
//! devices.
//!
//! Every tool runs the same three steps. It resolves which network to
//! operate in, previews what an operation would touch, and asks before
//! committing anything destructive.
//!
//! # Modules
//!
//! - [`resolver`]: picks and binds the active network (flag, environment,
//!   single candidate, or an interactive choice).
//! - [`gate`]: yes/no confirmation before a destructive commit.
//! - [`executor`]: preview, gate, commit, and the resulting report.
//! - [`operations`]: the concrete operations the tools run.
//! - [`auth`], [`client`], [`error`]: OAuth2 tokens and the authenticated
//!   REST client.
//! - [`networks`], [`content`], [`devices`]: endpoint wrappers.
//! - [`console`], [`render`], [`cli`], [`config`], [`logging`]: tool plumbing.
//!
//! # Quick Start
//!
//! ```ignore
//! use bsn_cli::console::TerminalConsole;
//! use bsn_cli::executor::execute;
//! use bsn_cli::operations::{ConfirmPolicy, DeleteContent};
//!
//! let op = DeleteContent { client: &client, filter: Some(filter), policy };
//! let report = execute(&op, false, &mut TerminalConsole::new()).await?;
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod console;
pub mod content;
pub mod devices;
pub mod error;
pub mod executor;
pub mod gate;
pub mod logging;
pub mod networks;
pub mod operations;
pub mod render;
pub mod resolver;

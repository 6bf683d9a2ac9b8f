//! CLI module for session-sync.
//!
//! Parses arguments and runs the `watch` and `messages` commands on a
//! tokio runtime.
//!
//! ```ignore
//! use session_sync::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args());
//! run_cli_command(command)?;
//! ```

pub mod args;
pub mod messages;
pub mod version;
pub mod watch;

pub use args::{parse_args, CliCommand, USAGE};
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::{Report, Result};
use tracing::error;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::jobs::JobFilter;

/// Run a parsed CLI command to completion.
pub fn run_cli_command(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Version => {
            handle_version_command();
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Invalid(message) => Err(eyre!("{}\n\n{}", message, USAGE)),
        CliCommand::Watch {
            connector_id,
            connector_type,
        } => {
            let config = SyncConfig::from_env()?;
            let filter = JobFilter {
                connector_id,
                connector_type,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            finish(runtime.block_on(watch::run_watch(config, filter)))
        }
        CliCommand::Messages { thread_id } => {
            let config = SyncConfig::from_env()?;
            let runtime = tokio::runtime::Runtime::new()?;
            finish(runtime.block_on(messages::run_messages(config, thread_id)))
        }
    }
}

fn finish(result: SyncResult<()>) -> Result<()> {
    result.map_err(report)
}

/// Log the full error and turn it into the short message shown on exit.
fn report(err: SyncError) -> Report {
    error!(
        "{} [{}] {} (retryable: {})",
        err.category(),
        err.error_code(),
        err,
        err.is_retryable()
    );
    let message = eyre!("[{}] {}", err.error_code(), err.user_message());
    if err.requires_reauth() {
        message.wrap_err("session expired")
    } else {
        message
    }
}

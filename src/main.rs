use color_eyre::Result;
use session_sync::cli::{parse_args, run_cli_command, CliCommand};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let command = parse_args(std::env::args());

    // --version must not depend on any initialization
    if command == CliCommand::Version {
        return run_cli_command(command);
    }

    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "session_sync=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli_command(command)
}

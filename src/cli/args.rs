//! Command-line argument parsing for the session-sync CLI.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Follow the job stream and log every update
    Watch {
        connector_id: Option<String>,
        connector_type: Option<String>,
    },
    /// Fetch the messages of one thread once
    Messages { thread_id: String },
    /// Print usage
    Help,
    /// Arguments could not be understood
    Invalid(String),
}

pub const USAGE: &str = "\
Usage: session-sync <command>

Commands:
  watch [--connector-id ID] [--connector-type TYPE]   follow the job stream
  messages <thread_id>                                fetch a thread's messages
  --version, -V                                       print the version";

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use session_sync::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["session-sync".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let mut args = args.skip(1);

    let command = match args.next() {
        Some(command) => command,
        None => return CliCommand::Help,
    };

    match command.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "--help" | "-h" | "help" => CliCommand::Help,
        "watch" => parse_watch(args),
        "messages" => match (args.next(), args.next()) {
            (Some(thread_id), None) if !thread_id.starts_with('-') => {
                CliCommand::Messages { thread_id }
            }
            (None, _) => CliCommand::Invalid("messages: missing <thread_id>".to_string()),
            _ => CliCommand::Invalid("messages: expected exactly one <thread_id>".to_string()),
        },
        other => CliCommand::Invalid(format!("unknown command '{}'", other)),
    }
}

fn parse_watch<I>(mut args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut connector_id = None;
    let mut connector_type = None;

    while let Some(flag) = args.next() {
        let slot = match flag.as_str() {
            "--connector-id" => &mut connector_id,
            "--connector-type" => &mut connector_type,
            other => return CliCommand::Invalid(format!("watch: unknown flag '{}'", other)),
        };
        match args.next() {
            Some(value) => *slot = Some(value),
            None => return CliCommand::Invalid(format!("watch: {} needs a value", flag)),
        }
    }

    CliCommand::Watch {
        connector_id,
        connector_type,
    }
}

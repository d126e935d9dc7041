//! Command-line argument parsing.
//!
//! This module handles parsing command-line arguments and determining
//! which CLI command to execute.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Run the transport server (default)
    Serve,
    /// Stream the answer to a query and render it in place
    Ask(String),
    /// Fetch the answer from the non-streaming reference endpoint
    Complete(String),
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Unrecognized subcommand
    Unknown(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// Everything after `ask` or `complete` is joined with spaces to form the
/// query, so quoting on the shell is optional.
///
/// # Examples
///
/// ```
/// use tokenflow::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["tokenflow".to_string(), "ask".to_string(), "hi".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Ask("hi".to_string()));
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let mut args = args.skip(1);

    let Some(first) = args.next() else {
        return CliCommand::Serve;
    };

    match first.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "--help" | "-h" | "help" => CliCommand::Help,
        "serve" => CliCommand::Serve,
        "ask" => CliCommand::Ask(args.collect::<Vec<_>>().join(" ")),
        "complete" => CliCommand::Complete(args.collect::<Vec<_>>().join(" ")),
        _ => CliCommand::Unknown(first),
    }
}

/// Usage text printed by `--help`.
pub const USAGE: &str = "\
Usage: tokenflow [COMMAND]

Commands:
  serve               Run the stream server (default)
  ask <query...>      Stream an answer and render it as it arrives
  complete <query...> Fetch the whole answer in one response

Options:
  -h, --help          Show this help
  -V, --version       Show version";

//! Command-line interface.
//!
//! This module provides:
//! - Argument parsing
//! - The `serve`, `ask` and `complete` commands
//! - Version display
//!
//! # Usage
//!
//! ```ignore
//! use tokenflow::cli::{parse_args, run_cli_command};
//! use tokenflow::config::Config;
//!
//! let command = parse_args(std::env::args());
//! run_cli_command(command, &Config::from_env()).await?;
//! ```

pub mod args;
pub mod ask;
pub mod complete;
pub mod serve;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use ask::handle_ask_command;
pub use complete::handle_complete_command;
pub use serve::handle_serve_command;
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::config::Config;

/// Run a parsed CLI command to completion.
pub async fn run_cli_command(command: CliCommand, config: &Config) -> Result<()> {
    match command {
        CliCommand::Serve => handle_serve_command(config).await,
        CliCommand::Ask(query) => handle_ask_command(config, &query).await,
        CliCommand::Complete(query) => handle_complete_command(config, &query).await,
        CliCommand::Version => {
            handle_version_command();
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Unknown(arg) => Err(eyre!("Unknown command '{}'\n\n{}", arg, USAGE)),
    }
}

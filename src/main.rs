use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokenflow::cli::{handle_version_command, parse_args, run_cli_command, CliCommand, USAGE};
use tokenflow::config::Config;

fn main() -> Result<()> {
    let command = parse_args(std::env::args());

    // Handle flags that need no runtime before any initialization
    match command {
        CliCommand::Version => {
            handle_version_command();
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    color_eyre::install()?;

    // Logs go to stderr so `ask` output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokenflow=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_cli_command(command, &config))
}

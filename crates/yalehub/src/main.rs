mod cli;
mod commands;
mod error;
mod host;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use yalehub_config::ConfigFile;
use yalehub_core::{LoggingMode, PlatformConfig};

use crate::cli::Cli;
use crate::error::CliError;

/// Crates whose log level follows the configured logging mode.
const LOG_TARGETS: [&str; 4] = ["yalehub", "yalehub_core", "yalehub_api", "yalehub_config"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Map a logging mode to an `EnvFilter` directive. `RUST_LOG` wins.
fn filter_directive(mode: LoggingMode) -> String {
    let level = match mode {
        LoggingMode::None => return "off".into(),
        LoggingMode::Standard => "info",
        LoggingMode::Debug => "debug",
        LoggingMode::DebugMode => "trace",
    };

    let mut directive = String::from("warn");
    for target in LOG_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

fn init_tracing(mode: LoggingMode) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(filter_directive(mode))),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let file = ConfigFile::resolve(cli.global.config.as_deref());

    // Logging depends on the config, so load it before tracing is up.
    let loaded = file
        .load()
        .map_err(CliError::from)
        .and_then(|raw| Ok(PlatformConfig::verify(raw, cli.global.debug)?));

    let mode = match &loaded {
        Ok(config) => config.options.logging,
        Err(_) => LoggingMode::resolve(None, cli.global.debug),
    };
    init_tracing(mode);

    let config = loaded?;
    tracing::debug!(command = ?cli.command, path = %file.path().display(), "dispatching command");
    commands::dispatch(cli.command, config, file, &cli.global).await
}

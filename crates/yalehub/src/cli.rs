//! Clap derive structures for the `yalehub` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// yalehub -- run and control Yale Connect smart locks
#[derive(Debug, Parser)]
#[command(
    name = "yalehub",
    version,
    about = "Keep Yale Connect smart locks in sync and control them",
    long_about = "Bridges Yale Connect cloud locks into a local accessory host.\n\n\
        Reads the YaleHubConnect platform block from the host config file,\n\
        validates the account once, then polls each lock and forwards\n\
        lock/unlock requests.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Host config file holding the YaleHubConnect platform block
    #[arg(long, short = 'c', env = "YALEHUB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging when the config does not set a logging mode
    #[arg(long, short = 'D', global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Override both API roots (testing against a local server)
    #[arg(long, env = "YALEHUB_API_BASE", global = true, hide = true)]
    pub api_base: Option<url::Url>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one endpoint id per line (scripting)
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the platform and keep every lock in sync until Ctrl-C
    Run(RunArgs),

    /// Validate the account and save home, entry code and token to the config
    Validate,

    /// List locks on the account
    #[command(alias = "ls")]
    Locks,

    /// Lock a door
    Lock(TargetArgs),

    /// Unlock a door
    Unlock(TargetArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Accessory cache file (defaults to the platform data directory)
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Endpoint id of the lock (see `yalehub locks`)
    pub endpoint: i64,
}

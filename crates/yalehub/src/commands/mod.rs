//! Command dispatch: bridges CLI args -> platform operations -> output.

pub mod locks;
pub mod run;
pub mod util;
pub mod validate;

use yalehub_config::ConfigFile;
use yalehub_core::PlatformConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command with a verified platform configuration.
pub async fn dispatch(
    cmd: Command,
    config: PlatformConfig,
    file: ConfigFile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Run(args) => run::handle(config, file, args, global).await,
        Command::Validate => validate::handle(config, file, global).await,
        Command::Locks => locks::list(config, file, global).await,
        Command::Lock(args) => locks::lock(config, file, args, global).await,
        Command::Unlock(args) => locks::unlock(config, file, args, global).await,
    }
}

//! `yalehub validate`: look up the account and persist the results.

use yalehub_config::ConfigFile;
use yalehub_core::PlatformConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::util;

pub async fn handle(
    config: PlatformConfig,
    file: ConfigFile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = file.path().display().to_string();
    let (mut platform, _client) = util::one_shot_platform(config, file, global)?;

    let record = platform.validate_account().await?;

    if !global.quiet {
        if record.is_validated {
            eprintln!(
                "Account {} validated; home {} saved to {path}",
                record.account_id, record.home_id
            );
        } else {
            eprintln!("Account lookup returned 0; saved to {path} but not validated");
        }
    }
    Ok(())
}

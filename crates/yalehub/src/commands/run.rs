//! `yalehub run`: start the platform and keep locks in sync until Ctrl-C.

use std::sync::Arc;

use tracing::{info, warn};
use yalehub_config::ConfigFile;
use yalehub_core::{AccessoryHost, Platform, PlatformConfig};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::host::{self, ConsoleHost};

use super::util;

pub async fn handle(
    config: PlatformConfig,
    file: ConfigFile,
    args: RunArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cache_path = args.cache.unwrap_or_else(host::default_cache_path);
    let cached = host::load_cache(&cache_path)?;
    let console = Arc::new(ConsoleHost::new(cache_path));

    let client = Arc::new(util::build_client(&config, global)?);
    let mut platform = Platform::new(
        config,
        client,
        Arc::clone(&console) as Arc<dyn AccessoryHost>,
        Arc::new(file),
    );

    for accessory in cached {
        console.restore(accessory.clone());
        platform.configure_accessory(accessory);
    }

    // Start failures are already logged by the platform; the host stays up
    // with whatever accessories it has until it is stopped.
    if platform.did_finish_launching().await.is_err() {
        warn!("no locks are being synced; fix the configuration and restart");
    }
    info!(locks = platform.handles().len(), "platform running; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    platform.shutdown().await;
    console.save_cache();
    Ok(())
}

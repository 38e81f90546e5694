//! Shared helpers for command handlers.

use std::sync::Arc;

use yalehub_config::ConfigFile;
use yalehub_core::{
    AccessoryHost, CoreError, Endpoints, LockHandle, Platform, PlatformAccessory, PlatformConfig,
    TransportConfig, YaleClient,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build the HTTP client from the configured timeout and any API override.
pub fn build_client(config: &PlatformConfig, global: &GlobalOpts) -> Result<YaleClient, CliError> {
    let endpoints = match &global.api_base {
        Some(base) => Endpoints::single(base).map_err(CoreError::from)?,
        None => Endpoints::default(),
    };
    let transport = TransportConfig {
        timeout: config.options.timeout,
        endpoints,
    };

    let client = YaleClient::new(&transport).map_err(CoreError::from)?;
    if let Some(token) = &config.credentials.access_token {
        client.set_access_token(token.clone());
    }
    Ok(client)
}

/// Host for one-shot commands: nothing is presented or cached.
pub struct DetachedHost;

impl AccessoryHost for DetachedHost {
    fn register_accessories(&self, _accessories: &[PlatformAccessory]) {}

    fn update_accessories(&self, _accessories: &[PlatformAccessory]) {}

    fn unregister_accessories(&self, _accessories: &[PlatformAccessory]) {}

    fn bind(&self, _accessory: &PlatformAccessory, _handle: LockHandle) {}
}

/// A platform wired to the real client, for commands that do not run
/// controllers.
pub fn one_shot_platform(
    config: PlatformConfig,
    file: ConfigFile,
    global: &GlobalOpts,
) -> Result<(Platform<YaleClient>, Arc<YaleClient>), CliError> {
    let client = Arc::new(build_client(&config, global)?);
    let platform = Platform::new(
        config,
        Arc::clone(&client),
        Arc::new(DetachedHost),
        Arc::new(file),
    );
    Ok((platform, client))
}

pub fn require_validated(config: &PlatformConfig) -> Result<(), CliError> {
    if config.credentials.is_validated {
        Ok(())
    } else {
        Err(CliError::NotValidated)
    }
}

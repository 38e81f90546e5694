//! Lock listing and one-shot lock/unlock.

use tabled::Tabled;
use tracing::debug;
use yalehub_config::ConfigFile;
use yalehub_core::{
    CoreError, LockCurrentState, LockRecord, LockTargetState, PlatformConfig, StatusLowBattery,
};

use crate::cli::{GlobalOpts, TargetArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LockRow {
    #[tabled(rename = "Endpoint")]
    endpoint: i64,
    #[tabled(rename = "Device")]
    device: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Battery")]
    battery: String,
    #[tabled(rename = "Online")]
    online: String,
}

impl From<&LockRecord> for LockRow {
    fn from(r: &LockRecord) -> Self {
        Self {
            endpoint: r.endpoint_id,
            device: r.device_id,
            name: r.description.clone(),
            model: r.doorlock_type_name.clone(),
            state: LockCurrentState::from_status_name(&r.status_name).to_string(),
            battery: StatusLowBattery::from_low_battery(r.low_battery).to_string(),
            online: if r.is_online { "yes" } else { "no" }.into(),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(
    config: PlatformConfig,
    file: ConfigFile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_validated(&config)?;
    let (mut platform, _client) = util::one_shot_platform(config, file, global)?;

    let locks = platform.connect().await?;
    let out = output::render_list(
        &global.output,
        &locks,
        |r| LockRow::from(r),
        |r| r.endpoint_id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn lock(
    config: PlatformConfig,
    file: ConfigFile,
    args: TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    send(config, file, args.endpoint, LockTargetState::Secured, global).await
}

pub async fn unlock(
    config: PlatformConfig,
    file: ConfigFile,
    args: TargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    send(config, file, args.endpoint, LockTargetState::Unsecured, global).await
}

async fn send(
    config: PlatformConfig,
    file: ConfigFile,
    endpoint_id: i64,
    target: LockTargetState,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_validated(&config)?;
    let (mut platform, client) = util::one_shot_platform(config, file, global)?;

    let locks = platform.connect().await?;
    let record = locks
        .iter()
        .find(|l| l.endpoint_id == endpoint_id)
        .ok_or(CoreError::LockNotFound { endpoint_id })?;
    debug!(lock = %record.description, target = %target, "sending one-shot command");

    let result = match target {
        LockTargetState::Secured => client.lock(endpoint_id).await,
        LockTargetState::Unsecured => client.unlock(endpoint_id).await,
    }
    .map_err(CoreError::from)?;

    if !global.quiet {
        if result.result {
            eprintln!("{} {}", record.description, target.verb());
        } else {
            eprintln!(
                "{}: command accepted, lock did not confirm",
                record.description
            );
        }
    }
    Ok(())
}

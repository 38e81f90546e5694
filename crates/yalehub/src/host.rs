//! Console accessory host.
//!
//! Stands in for a home-automation bridge: keeps registered accessories in
//! memory, mirrors them to a JSON cache file so they are restored on the
//! next start, and logs every lock state change.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use directories::ProjectDirs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use yalehub_core::{AccessoryHost, LockHandle, LockSnapshot, LoggingMode, PlatformAccessory};

use crate::error::CliError;

/// Default cache location in the platform data directory.
pub fn default_cache_path() -> PathBuf {
    ProjectDirs::from("com", "yalehub", "yalehub").map_or_else(
        || PathBuf::from("accessories.json"),
        |dirs| dirs.data_dir().join("accessories.json"),
    )
}

/// Read cached accessories. A missing file is an empty cache.
pub fn load_cache(path: &Path) -> Result<Vec<PlatformAccessory>, CliError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let accessories: Vec<PlatformAccessory> = serde_json::from_str(&text)?;
            debug!(count = accessories.len(), path = %path.display(), "loaded accessory cache");
            Ok(accessories)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[derive(Clone)]
pub struct ConsoleHost {
    accessories: Arc<DashMap<Uuid, PlatformAccessory>>,
    cache_path: Arc<PathBuf>,
}

impl ConsoleHost {
    pub fn new(cache_path: PathBuf) -> Self {
        Self {
            accessories: Arc::new(DashMap::new()),
            cache_path: Arc::new(cache_path),
        }
    }

    /// Seed with an accessory read from the cache.
    pub fn restore(&self, accessory: PlatformAccessory) {
        self.accessories.insert(accessory.uuid, accessory);
    }

    /// Write every known accessory to the cache file. Failures are logged.
    pub fn save_cache(&self) {
        if let Err(e) = write_cache(&self.accessories, &self.cache_path) {
            warn!(error = %e, path = %self.cache_path.display(), "failed to save accessory cache");
        }
    }
}

fn write_cache(
    accessories: &DashMap<Uuid, PlatformAccessory>,
    path: &Path,
) -> Result<(), CliError> {
    let mut all: Vec<PlatformAccessory> = accessories.iter().map(|e| e.value().clone()).collect();
    all.sort_by_key(|a| a.uuid);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&all)?)?;
    Ok(())
}

impl AccessoryHost for ConsoleHost {
    fn register_accessories(&self, accessories: &[PlatformAccessory]) {
        for accessory in accessories {
            info!(accessory = %accessory.display_name, uuid = %accessory.uuid, "registered accessory");
            self.accessories.insert(accessory.uuid, accessory.clone());
        }
        self.save_cache();
    }

    fn update_accessories(&self, accessories: &[PlatformAccessory]) {
        for accessory in accessories {
            self.accessories.insert(accessory.uuid, accessory.clone());
        }
        self.save_cache();
    }

    fn unregister_accessories(&self, accessories: &[PlatformAccessory]) {
        for accessory in accessories {
            info!(accessory = %accessory.display_name, "unregistered accessory");
            self.accessories.remove(&accessory.uuid);
        }
        self.save_cache();
    }

    /// Mirror every published snapshot into the accessory context.
    fn bind(&self, accessory: &PlatformAccessory, handle: LockHandle) {
        let host = self.clone();
        let uuid = accessory.uuid;
        let mut rx = handle.subscribe();
        drop(handle);

        tokio::spawn(async move {
            let mut last: Option<LockSnapshot> = None;
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();

                let Some((name, logging)) = host.accessories.get_mut(&uuid).map(|mut a| {
                    a.context.remember(&snapshot);
                    (a.display_name.clone(), a.context.logging.unwrap_or_default())
                }) else {
                    break;
                };

                if report_state(&name, logging, last.as_ref(), &snapshot) {
                    host.save_cache();
                }
                last = Some(snapshot);
            }
            debug!(%uuid, "state watcher stopped");
        });
    }
}

/// Log a published snapshot. Returns whether the characteristics changed.
///
/// Unchanged polls are only reported for accessories in a debug logging
/// mode.
fn report_state(
    name: &str,
    logging: LoggingMode,
    last: Option<&LockSnapshot>,
    snapshot: &LockSnapshot,
) -> bool {
    let changed = last.is_none_or(|prev| {
        prev.current != snapshot.current
            || prev.target != snapshot.target
            || prev.battery != snapshot.battery
    });

    if changed {
        info!(
            lock = %name,
            current = %snapshot.current,
            current_value = snapshot.current.hap_value(),
            target = %snapshot.target,
            target_value = snapshot.target.hap_value(),
            battery = %snapshot.battery,
            battery_value = snapshot.battery.hap_value(),
            "lock state"
        );
    } else if logging.is_debug() {
        info!(
            lock = %name,
            status = snapshot.status_name.as_deref().unwrap_or("-"),
            online = ?snapshot.is_online,
            "lock status unchanged"
        );
    }
    changed
}

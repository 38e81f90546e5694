// ── Host seam ──
//
// The process embedding the platform owns accessory presentation and the
// accessory cache. The core only asks it to register, update and
// unregister accessories, and hands it a `LockHandle` per lock.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use yalehub_api::LockRecord;

use crate::config::LoggingMode;
use crate::device::LockHandle;
use crate::error::CoreError;
use crate::model::AccessoryContext;

/// Reported as the accessory manufacturer for every lock.
pub const MANUFACTURER: &str = "Yale Home Inc.";

/// Namespace for accessory ids. Fixed forever: changing it orphans every
/// cached accessory.
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x5f1c_8a2e_4b7d_4e39_9a61_0c3d_7e2b_9f14);

/// Stable accessory id for a physical lock.
pub fn accessory_uuid(device_id: i64) -> Uuid {
    Uuid::new_v5(&ACCESSORY_NAMESPACE, device_id.to_string().as_bytes())
}

/// One lock as presented by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAccessory {
    pub uuid: Uuid,
    pub display_name: String,
    pub manufacturer: String,
    pub model: String,
    /// Serial number shown to the user; the device id.
    pub serial_number: String,
    #[serde(default)]
    pub context: AccessoryContext,
}

impl PlatformAccessory {
    pub fn new(record: &LockRecord, logging: LoggingMode) -> Self {
        let mut accessory = Self {
            uuid: accessory_uuid(record.device_id),
            display_name: String::new(),
            manufacturer: MANUFACTURER.to_owned(),
            model: String::new(),
            serial_number: String::new(),
            context: AccessoryContext::for_record(record, logging),
        };
        accessory.refresh_from(record);
        accessory
    }

    /// Overwrite everything derived from the lock record.
    pub fn refresh_from(&mut self, record: &LockRecord) {
        self.display_name.clone_from(&record.description);
        self.model.clone_from(&record.doorlock_type_name);
        self.serial_number = record.device_id.to_string();
        self.context.set_record(record);
    }

    pub fn endpoint_id(&self) -> Option<i64> {
        self.context.endpoint_id
    }
}

/// What the embedding process must provide.
pub trait AccessoryHost: Send + Sync {
    fn register_accessories(&self, accessories: &[PlatformAccessory]);

    fn update_accessories(&self, accessories: &[PlatformAccessory]);

    fn unregister_accessories(&self, accessories: &[PlatformAccessory]);

    /// Attach a running lock controller to a registered accessory.
    fn bind(&self, accessory: &PlatformAccessory, handle: LockHandle);
}

/// Validation results written back to the configuration file.
#[derive(Debug, Clone)]
pub struct ValidationRecord {
    pub home_id: i64,
    pub entry_code: SecretString,
    pub access_token: Option<SecretString>,
    pub is_validated: bool,
    pub account_id: i64,
}

/// Persists validation results for the next start.
pub trait ConfigStore: Send + Sync {
    fn persist_validation(&self, record: &ValidationRecord) -> Result<(), CoreError>;
}

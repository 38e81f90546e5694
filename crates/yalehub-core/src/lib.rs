// yalehub-core: Lock state sync and platform orchestration on top of yalehub-api.

pub mod api;
pub mod config;
pub mod device;
pub mod error;
pub mod host;
pub mod model;
pub mod platform;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::HubApi;
pub use config::{
    Credentials, LoggingMode, Options, PLATFORM_NAME, PlatformConfig, RawCredentials, RawOptions,
    RawPlatformConfig,
};
pub use device::{ControllerSettings, LockController, LockHandle};
pub use error::CoreError;
pub use host::{
    AccessoryHost, ConfigStore, MANUFACTURER, PlatformAccessory, ValidationRecord, accessory_uuid,
};
pub use model::{AccessoryContext, LockCurrentState, LockSnapshot, LockTargetState, StatusLowBattery};
pub use platform::Platform;

// Transport types callers need to build a client.
pub use yalehub_api::{Endpoints, LockRecord, TransportConfig, YaleClient};

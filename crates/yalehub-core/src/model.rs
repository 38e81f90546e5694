// ── Lock domain model ──
//
// Characteristic-style values exposed to the host, plus the per-accessory
// context that survives restarts. Numeric values match the HomeKit lock
// characteristics so a host adapter can pass them through unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use yalehub_api::LockRecord;

use crate::config::LoggingMode;

/// Status names reported by the lock feed.
const STATUS_CLOSED: &str = "Close";
const STATUS_OPEN: &str = "Open";

/// Observed lock position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockCurrentState {
    Unsecured,
    Secured,
    Unknown,
}

impl LockCurrentState {
    /// Map a feed status name. Exact, case-sensitive match.
    pub fn from_status_name(status: &str) -> Self {
        match status {
            STATUS_CLOSED => Self::Secured,
            STATUS_OPEN => Self::Unsecured,
            _ => Self::Unknown,
        }
    }

    /// Word for log lines: "Locked", "Unlocked" or "Unknown".
    pub fn verb(self) -> &'static str {
        match self {
            Self::Secured => "Locked",
            Self::Unsecured => "Unlocked",
            Self::Unknown => "Unknown",
        }
    }

    pub fn hap_value(self) -> u8 {
        match self {
            Self::Unsecured => 0,
            Self::Secured => 1,
            Self::Unknown => 3,
        }
    }
}

/// Requested lock position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockTargetState {
    Unsecured,
    Secured,
}

impl LockTargetState {
    pub fn hap_value(self) -> u8 {
        match self {
            Self::Unsecured => 0,
            Self::Secured => 1,
        }
    }

    /// Verb for log lines: "Locked" or "Unlocked".
    pub fn verb(self) -> &'static str {
        match self {
            Self::Secured => "Locked",
            Self::Unsecured => "Unlocked",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusLowBattery {
    #[default]
    Normal,
    Low,
}

impl StatusLowBattery {
    pub fn from_low_battery(low_battery: bool) -> Self {
        if low_battery { Self::Low } else { Self::Normal }
    }

    pub fn hap_value(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Low => 1,
        }
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Latest known state of one lock, as published to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockSnapshot {
    pub current: LockCurrentState,
    pub target: LockTargetState,
    pub battery: StatusLowBattery,
    /// Raw status name from the last successful poll.
    pub status_name: Option<String>,
    pub is_online: Option<bool>,
    /// When the last successful poll landed. `None` until the first one.
    pub updated_at: Option<DateTime<Utc>>,
}

impl LockSnapshot {
    /// Seed from a restored accessory context; missing values default to
    /// a secured lock with a normal battery.
    pub fn restore(context: &AccessoryContext) -> Self {
        Self {
            current: context
                .lock_current_state
                .unwrap_or(LockCurrentState::Secured),
            target: context
                .lock_target_state
                .unwrap_or(LockTargetState::Secured),
            battery: context.status_low_battery.unwrap_or_default(),
            status_name: None,
            is_online: None,
            updated_at: None,
        }
    }

    /// Fold a fresh status record in. The target is left alone.
    pub fn apply(&mut self, record: &LockRecord, at: DateTime<Utc>) {
        self.current = LockCurrentState::from_status_name(&record.status_name);
        self.battery = StatusLowBattery::from_low_battery(record.low_battery);
        self.status_name = Some(record.status_name.clone());
        self.is_online = Some(record.is_online);
        self.updated_at = Some(at);
    }
}

// ── Accessory context ────────────────────────────────────────────────

/// Per-accessory state persisted by the host between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<LockRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "endpointID", default, skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_current_state: Option<LockCurrentState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_target_state: Option<LockTargetState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_low_battery: Option<StatusLowBattery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingMode>,
}

impl AccessoryContext {
    /// Fresh context for a discovered lock.
    pub fn for_record(record: &LockRecord, logging: LoggingMode) -> Self {
        let mut context = Self {
            logging: Some(logging),
            ..Self::default()
        };
        context.set_record(record);
        context
    }

    /// Replace the device record and the fields derived from it.
    pub fn set_record(&mut self, record: &LockRecord) {
        self.device = Some(record.clone());
        self.model = Some(record.doorlock_type_name.clone());
        self.endpoint_id = Some(record.endpoint_id);
    }

    /// Copy a published snapshot in so it is restored on the next start.
    pub fn remember(&mut self, snapshot: &LockSnapshot) {
        self.lock_current_state = Some(snapshot.current);
        self.lock_target_state = Some(snapshot.target);
        self.status_low_battery = Some(snapshot.battery);
    }
}

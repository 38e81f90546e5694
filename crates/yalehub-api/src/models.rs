// Yale Connect wire types
//
// The HomeCloud services use PascalCase envelopes (`LoginResult`,
// `ResponseStatus`), the apinet surface mixes PascalCase roots with
// camelCase records. Fields use `#[serde(default)]` liberally because the
// service omits or nulls fields depending on the hub model.

use serde::{Deserialize, Serialize};

// ── Shared status block ──────────────────────────────────────────────

/// Embedded status returned inside every HomeCloud result. `Status == 0`
/// means success regardless of the HTTP status code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseStatus {
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub status: i64,
}

impl ResponseStatus {
    pub fn is_ok(&self) -> bool {
        self.status == 0
    }

    /// Messages joined for error reporting.
    pub fn message(&self) -> String {
        if self.messages.is_empty() {
            format!("status {}", self.status)
        } else {
            self.messages.join("; ")
        }
    }
}

/// The `{"Token": "..."}` wrapper the HomeCloud services expect in bodies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenBody {
    #[serde(rename = "Token")]
    pub token: Option<String>,
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginResponse {
    pub login_result: LoginResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginResult {
    #[serde(default)]
    pub access_token: Option<TokenBody>,
    #[serde(default)]
    pub login_type: i64,
    #[serde(default)]
    pub response_status: ResponseStatus,
}

// ── Account lookup ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AccountIdResponse {
    #[serde(rename = "GetAccountIDFromEmailResult")]
    pub result: AccountIdResult,
}

#[derive(Debug, Deserialize)]
pub struct AccountIdResult {
    #[serde(rename = "AccountID", default)]
    pub account_id: i64,
    #[serde(rename = "ResponseStatus", default)]
    pub response_status: ResponseStatus,
}

// ── Access control ───────────────────────────────────────────────────

/// Admin access-control user for the account, including its door locks.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessControlUser {
    /// Numeric PIN required by lock/unlock, delivered as a string.
    #[serde(rename = "EntryCode", default)]
    pub entry_code: Option<String>,
    #[serde(rename = "HomeIDs", default)]
    pub home_ids: Vec<i64>,
    #[serde(rename = "DoorLocks", default)]
    pub door_locks: Vec<DoorLock>,
}

/// One access-control slot on a lock: the descriptive half of a lock record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorLock {
    #[serde(rename = "endpointID")]
    pub endpoint_id: i64,
    #[serde(rename = "accessControlSlotID", default)]
    pub access_control_slot_id: i64,
    #[serde(rename = "accessControlUserID", default)]
    pub access_control_user_id: i64,
    #[serde(rename = "slotID", default)]
    pub slot_id: i64,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub synchronized: bool,
}

// ── Updated objects ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedObjectsResponse {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Live status of one endpoint: the state half of a lock record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(rename = "endpointID")]
    pub endpoint_id: i64,
    #[serde(rename = "deviceID", default)]
    pub device_id: i64,
    #[serde(default)]
    pub description: String,
    /// Free text, compared literally (`"Open"`, `"Close"`).
    #[serde(default)]
    pub status_name: String,
    #[serde(rename = "statusID", default)]
    pub status_id: i64,
    #[serde(default)]
    pub doorlock_type_name: String,
    #[serde(default)]
    pub low_battery: bool,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub enabled: bool,
}

// ── Lock / unlock ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LockUnlockResponse {
    #[serde(rename = "DoorlockLockUnlockResult")]
    pub result: LockUnlockResult,
}

/// Status payload of a lock/unlock command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LockUnlockResult {
    #[serde(default)]
    pub response_status: ResponseStatus,
    #[serde(default)]
    pub result: bool,
}

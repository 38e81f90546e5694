// Lock record merge
//
// A lock is described by two records on different endpoints: the
// access-control door lock (slot, enablement) and the live endpoint
// status (name, state, battery). They are joined on `endpointID`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::YaleClient;
use crate::error::Error;
use crate::models::{DoorLock, Endpoint};

/// Records that can be grouped by the endpoint they describe.
pub trait EndpointKeyed {
    fn endpoint_id(&self) -> i64;
}

impl EndpointKeyed for DoorLock {
    fn endpoint_id(&self) -> i64 {
        self.endpoint_id
    }
}

impl EndpointKeyed for Endpoint {
    fn endpoint_id(&self) -> i64 {
        self.endpoint_id
    }
}

/// Group records by endpoint id, keeping arrival order within a group.
pub fn group_by_endpoint<T: EndpointKeyed>(records: Vec<T>) -> BTreeMap<i64, Vec<T>> {
    let mut grouped: BTreeMap<i64, Vec<T>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.endpoint_id()).or_default().push(record);
    }
    grouped
}

/// One physical lock: a door-lock record merged with its endpoint status.
///
/// Also the shape of an entry in the configured lock list. Both ids are
/// required; the device id keys the accessory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    #[serde(rename = "endpointID")]
    pub endpoint_id: i64,
    #[serde(rename = "deviceID")]
    pub device_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub doorlock_type_name: String,
    #[serde(default)]
    pub status_name: String,
    #[serde(default)]
    pub low_battery: bool,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "accessControlSlotID", default)]
    pub access_control_slot_id: i64,
}

impl LockRecord {
    /// Status fields overwrite door-lock fields where both carry a value.
    pub fn merge(door_lock: &DoorLock, endpoint: &Endpoint) -> Self {
        Self {
            endpoint_id: endpoint.endpoint_id,
            device_id: endpoint.device_id,
            description: endpoint.description.clone(),
            doorlock_type_name: endpoint.doorlock_type_name.clone(),
            status_name: endpoint.status_name.clone(),
            low_battery: endpoint.low_battery,
            is_online: endpoint.is_online,
            enabled: endpoint.enabled,
            access_control_slot_id: door_lock.access_control_slot_id,
        }
    }
}

/// Inner join of access-control and status records on endpoint id.
///
/// Only the first record of each group is used. Endpoints missing from
/// either side are dropped, never partially filled.
pub fn merge_locks(
    locks_by_endpoint_id: &BTreeMap<i64, Vec<DoorLock>>,
    endpoints_by_endpoint_id: &BTreeMap<i64, Vec<Endpoint>>,
) -> Vec<LockRecord> {
    locks_by_endpoint_id
        .iter()
        .filter_map(|(endpoint_id, door_locks)| {
            let door_lock = door_locks.first()?;
            let Some(endpoint) = endpoints_by_endpoint_id
                .get(endpoint_id)
                .and_then(|e| e.first())
            else {
                debug!(endpoint_id, "no status record for endpoint, skipping");
                return None;
            };
            Some(LockRecord::merge(door_lock, endpoint))
        })
        .collect()
}

impl YaleClient {
    /// Fetch both record sets for the bound home and merge them.
    pub async fn get_locks(&self) -> Result<Vec<LockRecord>, Error> {
        let home = self.require_home()?;

        let access = self
            .get_admin_access_control_user_for_store(home.account_id)
            .await?;
        let endpoints = self.get_updated_objects(home.home_id).await?;

        let locks = merge_locks(&access.locks_by_endpoint_id, &endpoints);
        debug!(count = locks.len(), "locks merged");
        Ok(locks)
    }

    /// Look up one lock by endpoint id. Re-runs the full fetch.
    pub async fn details(&self, endpoint_id: i64) -> Result<Option<LockRecord>, Error> {
        let locks = self.get_locks().await?;
        Ok(locks.into_iter().find(|l| l.endpoint_id == endpoint_id))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn door_lock(endpoint_id: i64, slot: i64) -> DoorLock {
        DoorLock {
            endpoint_id,
            access_control_slot_id: slot,
            access_control_user_id: 7,
            slot_id: 1,
            enabled: true,
            synchronized: true,
        }
    }

    fn endpoint(endpoint_id: i64, status: &str) -> Endpoint {
        Endpoint {
            endpoint_id,
            device_id: endpoint_id * 10,
            description: format!("Door {endpoint_id}"),
            status_name: status.into(),
            status_id: 0,
            doorlock_type_name: "Conexis L1".into(),
            low_battery: false,
            is_online: true,
            enabled: false,
        }
    }

    #[test]
    fn merge_is_an_inner_join() {
        let access = group_by_endpoint(vec![door_lock(1, 100), door_lock(2, 200)]);
        let status = group_by_endpoint(vec![endpoint(2, "Close"), endpoint(3, "Open")]);

        let merged = merge_locks(&access, &status);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].endpoint_id, 2);
        assert_eq!(merged[0].access_control_slot_id, 200);
        assert_eq!(merged[0].status_name, "Close");
    }

    #[test]
    fn merge_is_idempotent() {
        let access = group_by_endpoint(vec![door_lock(1, 100), door_lock(2, 200)]);
        let status = group_by_endpoint(vec![endpoint(1, "Open"), endpoint(2, "Close")]);

        assert_eq!(merge_locks(&access, &status), merge_locks(&access, &status));
    }

    #[test]
    fn first_record_per_endpoint_wins() {
        let access = group_by_endpoint(vec![door_lock(5, 1), door_lock(5, 2)]);
        let status = group_by_endpoint(vec![endpoint(5, "Open"), endpoint(5, "Close")]);

        let merged = merge_locks(&access, &status);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].access_control_slot_id, 1);
        assert_eq!(merged[0].status_name, "Open");
    }

    #[test]
    fn endpoint_fields_override_door_lock_fields() {
        let access = group_by_endpoint(vec![door_lock(4, 1)]);
        let status = group_by_endpoint(vec![endpoint(4, "Close")]);

        let merged = merge_locks(&access, &status);

        // door lock says enabled, endpoint says disabled
        assert!(!merged[0].enabled);
    }

    #[test]
    fn configured_lock_entry_parses_with_defaults() {
        let record: LockRecord = serde_json::from_value(serde_json::json!({
            "endpointID": 42,
            "deviceID": 9,
            "description": "Back door"
        }))
        .expect("valid lock entry");

        assert_eq!(record.endpoint_id, 42);
        assert_eq!(record.device_id, 9);
        assert!(record.status_name.is_empty());
        assert!(!record.low_battery);
    }

    #[test]
    fn configured_lock_entry_requires_device_id() {
        let result = serde_json::from_value::<LockRecord>(serde_json::json!({
            "endpointID": 42,
            "description": "Back door"
        }));

        let err = result.expect_err("entry without deviceID");
        assert!(err.to_string().contains("deviceID"), "got {err}");
    }
}

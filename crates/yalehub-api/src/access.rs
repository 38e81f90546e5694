// Access-control and sync endpoints
//
// Both live on the apinet surface and authenticate with the
// `access-token` header instead of a token in the body.

use std::collections::BTreeMap;

use secrecy::SecretString;
use tracing::debug;

use crate::client::YaleClient;
use crate::error::Error;
use crate::locks::group_by_endpoint;
use crate::models::{AccessControlUser, DoorLock, Endpoint, UpdatedObjectsResponse};

/// Serial parameters for `GetUpdatedObjects`. All zero: every poll is a
/// full sync.
const FULL_SYNC_SERIALS: [&str; 5] = [
    "homeSR",
    "deviceSR",
    "endpointSR",
    "endpointValuesSR",
    "notificationSR",
];

/// Door-lock access-control records for an account, keyed by endpoint.
#[derive(Debug, Clone)]
pub struct AccessControl {
    pub locks_by_endpoint_id: BTreeMap<i64, Vec<DoorLock>>,
    pub home_ids: Vec<i64>,
    pub entry_code: Option<SecretString>,
}

impl YaleClient {
    /// Fetch the admin access-control user for an account.
    ///
    /// `GET Account/GetAdminAccessControlUserForStore?AccountID={id}`
    pub async fn get_admin_access_control_user_for_store(
        &self,
        account_id: i64,
    ) -> Result<AccessControl, Error> {
        let url = self.apinet_url("Account/GetAdminAccessControlUserForStore")?;
        debug!(account_id, "fetching access-control user");

        let user: AccessControlUser = self
            .get(url, &[("AccountID", account_id.to_string())])
            .await?;

        debug!(
            door_locks = user.door_locks.len(),
            homes = user.home_ids.len(),
            "access-control user fetched"
        );

        Ok(AccessControl {
            locks_by_endpoint_id: group_by_endpoint(user.door_locks),
            home_ids: user.home_ids,
            entry_code: user.entry_code.map(SecretString::from),
        })
    }

    /// Fetch the live endpoint records for a home.
    ///
    /// `GET App/GetUpdatedObjects?homeId={id}&homeSR=0&...`
    pub async fn get_updated_objects(
        &self,
        home_id: i64,
    ) -> Result<BTreeMap<i64, Vec<Endpoint>>, Error> {
        let url = self.apinet_url("App/GetUpdatedObjects")?;
        debug!(home_id, "fetching updated objects");

        let mut query = vec![("homeId", home_id.to_string())];
        query.extend(FULL_SYNC_SERIALS.iter().map(|k| (*k, "0".to_owned())));

        let resp: UpdatedObjectsResponse = self.get(url, &query).await?;
        debug!(endpoints = resp.endpoints.len(), "updated objects fetched");

        Ok(group_by_endpoint(resp.endpoints))
    }
}

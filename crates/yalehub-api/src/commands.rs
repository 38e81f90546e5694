// Lock/unlock command endpoint
//
// `POST HomeCloudCommandService.svc/DoorlockLockUnlock`. One call, no
// retry: a non-zero embedded status is surfaced as a rejection.

use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, warn};

use crate::client::YaleClient;
use crate::error::Error;
use crate::models::{LockUnlockResponse, LockUnlockResult};

impl YaleClient {
    /// Secure the lock on an endpoint.
    pub async fn lock(&self, endpoint_id: i64) -> Result<LockUnlockResult, Error> {
        self.doorlock_lock_unlock(endpoint_id, true).await
    }

    /// Release the lock on an endpoint.
    pub async fn unlock(&self, endpoint_id: i64) -> Result<LockUnlockResult, Error> {
        self.doorlock_lock_unlock(endpoint_id, false).await
    }

    async fn doorlock_lock_unlock(
        &self,
        endpoint_id: i64,
        is_locked: bool,
    ) -> Result<LockUnlockResult, Error> {
        let home = self.require_home()?;
        let url = self.services_url("HomeCloudCommandService.svc/DoorlockLockUnlock")?;
        debug!(endpoint_id, is_locked, "sending lock command");

        let body = json!({
            "token": self.token_body(),
            "endpointID": endpoint_id,
            "isLocked": is_locked,
            "entryCode": home.entry_code.expose_secret(),
        });

        let resp: LockUnlockResponse = self.post(url, &body).await?;
        let result = resp.result;

        if !result.response_status.is_ok() {
            return Err(Error::Rejected {
                endpoint_id,
                status: result.response_status.status,
                message: result.response_status.message(),
            });
        }

        if !result.result {
            warn!(endpoint_id, is_locked, "lock command accepted but reported no result");
        }
        Ok(result)
    }
}

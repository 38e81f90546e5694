// ── Remote API seam ──
//
// The orchestrator and controllers talk to the cloud through `HubApi`
// so tests can drive them with an in-memory fake. `YaleClient` is the
// only production implementation.

use std::future::Future;

use secrecy::SecretString;
use yalehub_api::{AccessControl, HomeContext, LockRecord, LockUnlockResult, YaleClient};

/// Remote calls the core needs from the Yale Connect cloud.
pub trait HubApi: Send + Sync + 'static {
    fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<SecretString, yalehub_api::Error>> + Send;

    fn get_account_id(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<i64, yalehub_api::Error>> + Send;

    fn get_access_control(
        &self,
        account_id: i64,
    ) -> impl Future<Output = Result<AccessControl, yalehub_api::Error>> + Send;

    /// Bind home-scoped calls (sync, lock, unlock) to a home.
    fn set_home(&self, home: HomeContext);

    fn get_locks(
        &self,
    ) -> impl Future<Output = Result<Vec<LockRecord>, yalehub_api::Error>> + Send;

    fn lock(
        &self,
        endpoint_id: i64,
    ) -> impl Future<Output = Result<LockUnlockResult, yalehub_api::Error>> + Send;

    fn unlock(
        &self,
        endpoint_id: i64,
    ) -> impl Future<Output = Result<LockUnlockResult, yalehub_api::Error>> + Send;
}

impl HubApi for YaleClient {
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, yalehub_api::Error> {
        YaleClient::login(self, email, password).await
    }

    async fn get_account_id(&self, email: &str) -> Result<i64, yalehub_api::Error> {
        YaleClient::get_account_id(self, email).await
    }

    async fn get_access_control(
        &self,
        account_id: i64,
    ) -> Result<AccessControl, yalehub_api::Error> {
        self.get_admin_access_control_user_for_store(account_id)
            .await
    }

    fn set_home(&self, home: HomeContext) {
        YaleClient::set_home(self, home);
    }

    async fn get_locks(&self) -> Result<Vec<LockRecord>, yalehub_api::Error> {
        YaleClient::get_locks(self).await
    }

    async fn lock(&self, endpoint_id: i64) -> Result<LockUnlockResult, yalehub_api::Error> {
        YaleClient::lock(self, endpoint_id).await
    }

    async fn unlock(&self, endpoint_id: i64) -> Result<LockUnlockResult, yalehub_api::Error> {
        YaleClient::unlock(self, endpoint_id).await
    }
}

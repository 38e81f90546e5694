// ── Platform orchestrator ──
//
// Startup sequence for the whole adapter: validate the account once and
// persist the result, discover locks, reconcile them against the host's
// cached accessories, and run one `LockController` per visible lock.

use std::slice;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use yalehub_api::{HomeContext, LockRecord};

use crate::api::HubApi;
use crate::config::PlatformConfig;
use crate::device::{ControllerSettings, LockController, LockHandle};
use crate::error::CoreError;
use crate::host::{AccessoryHost, ConfigStore, PlatformAccessory, ValidationRecord, accessory_uuid};

pub struct Platform<A> {
    config: PlatformConfig,
    api: Arc<A>,
    host: Arc<dyn AccessoryHost>,
    store: Arc<dyn ConfigStore>,
    /// Cached accessories handed in by the host, plus any we registered.
    accessories: Vec<PlatformAccessory>,
    handles: Vec<LockHandle>,
    tasks: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl<A: HubApi> Platform<A> {
    pub fn new(
        config: PlatformConfig,
        api: Arc<A>,
        host: Arc<dyn AccessoryHost>,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        debug!(name = %config.name, "finished initializing platform");
        Self {
            config,
            api,
            host,
            store,
            accessories: Vec::new(),
            handles: Vec::new(),
            tasks: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn accessories(&self) -> &[PlatformAccessory] {
        &self.accessories
    }

    /// Handles for every running lock controller.
    pub fn handles(&self) -> &[LockHandle] {
        &self.handles
    }

    pub fn handle(&self, endpoint_id: i64) -> Option<&LockHandle> {
        self.handles.iter().find(|h| h.endpoint_id() == endpoint_id)
    }

    /// Accept an accessory restored from the host cache. Must be called
    /// before `did_finish_launching`.
    pub fn configure_accessory(&mut self, accessory: PlatformAccessory) {
        info!(accessory = %accessory.display_name, "loading accessory from cache");
        self.accessories.push(accessory);
    }

    /// Host lifecycle hook: validate if needed, then discover.
    ///
    /// Failures are logged here and abandon the run; nothing is retried.
    pub async fn did_finish_launching(&mut self) -> Result<(), CoreError> {
        debug!("finished launching");

        let result = if self.config.credentials.is_validated {
            self.discover_devices().await
        } else {
            self.validate().await
        };

        if let Err(ref e) = result {
            error!(error = %e, "platform start failed");
        }
        result
    }

    /// Validate the account, persist the result, and discover on success.
    pub async fn validate(&mut self) -> Result<(), CoreError> {
        let record = self.validate_account().await?;
        if record.is_validated {
            self.discover_devices().await
        } else {
            warn!("account id lookup returned 0; account not validated");
            Ok(())
        }
    }

    /// Look up the account, home and entry code, then persist them.
    pub async fn validate_account(&mut self) -> Result<ValidationRecord, CoreError> {
        let email = self.config.credentials.email.clone();
        let token = self
            .api
            .login(&email, &self.config.credentials.password)
            .await?;
        let account_id = self.api.get_account_id(&email).await?;
        let access = self.api.get_access_control(account_id).await?;

        let home_id =
            access
                .home_ids
                .first()
                .copied()
                .ok_or_else(|| CoreError::ValidationFailed {
                    message: "account has no homes".into(),
                })?;
        let entry_code = access
            .entry_code
            .ok_or_else(|| CoreError::ValidationFailed {
                message: "account has no entry code".into(),
            })?;

        let record = ValidationRecord {
            home_id,
            entry_code,
            access_token: Some(token),
            is_validated: account_id != 0,
            account_id,
        };
        self.store.persist_validation(&record)?;

        self.config.home_id = Some(record.home_id);
        self.config.entry_code = Some(record.entry_code.clone());
        self.config.account_id = Some(record.account_id);
        self.config.credentials.access_token.clone_from(&record.access_token);
        self.config.credentials.is_validated = record.is_validated;

        info!(
            home_id,
            account_id,
            door_locks = access.locks_by_endpoint_id.len(),
            "account validated"
        );
        Ok(record)
    }

    /// Log in, bind the home, and start a controller per lock.
    pub async fn discover_devices(&mut self) -> Result<(), CoreError> {
        let locks = self.connect().await?;
        info!(count = locks.len(), "discovered locks");

        for record in &locks {
            self.create_lock(record);
        }
        Ok(())
    }

    /// Log in, bind the home, and return the lock list to manage: the
    /// configured list if present, else the merged cloud records.
    pub async fn connect(&mut self) -> Result<Vec<LockRecord>, CoreError> {
        let token = self
            .api
            .login(
                &self.config.credentials.email,
                &self.config.credentials.password,
            )
            .await?;
        self.config.credentials.access_token = Some(token);
        self.bind_home()?;

        if let Some(locks) = &self.config.locks {
            debug!(count = locks.len(), "using configured lock list");
            return Ok(locks.clone());
        }
        Ok(self.api.get_locks().await?)
    }

    fn bind_home(&self) -> Result<(), CoreError> {
        let (Some(home_id), Some(entry_code), Some(account_id)) = (
            self.config.home_id,
            self.config.entry_code.clone(),
            self.config.account_id,
        ) else {
            return Err(CoreError::config(
                "homeId, entryCode and accountId are required; validate the account first",
            ));
        };

        self.api.set_home(HomeContext {
            account_id,
            home_id,
            entry_code,
        });
        Ok(())
    }

    /// Reconcile one discovered lock with the cached accessories.
    fn create_lock(&mut self, record: &LockRecord) {
        if self.handle(record.endpoint_id).is_some() {
            debug!(endpoint = record.endpoint_id, "lock already running");
            return;
        }

        let uuid = accessory_uuid(record.device_id);
        let hidden = self.config.options.is_hidden(record.endpoint_id);
        let existing = self.accessories.iter().position(|a| a.uuid == uuid);

        match (existing, hidden) {
            (Some(index), false) => {
                let logging = self.config.options.logging;
                let accessory = &mut self.accessories[index];
                info!(accessory = %accessory.display_name, "restoring existing accessory from cache");
                accessory.refresh_from(record);
                accessory.context.logging = Some(logging);

                self.host.update_accessories(slice::from_ref(accessory));
                let accessory = accessory.clone();
                self.start_controller(&accessory, record);
            }
            (Some(index), true) => {
                let accessory = self.accessories.remove(index);
                info!(
                    accessory = %accessory.display_name,
                    endpoint = record.endpoint_id,
                    "removing hidden accessory from cache"
                );
                self.host
                    .unregister_accessories(slice::from_ref(&accessory));
            }
            (None, false) => {
                let accessory = PlatformAccessory::new(record, self.config.options.logging);
                info!(accessory = %accessory.display_name, "adding new accessory");

                self.host
                    .register_accessories(slice::from_ref(&accessory));
                self.accessories.push(accessory.clone());
                self.start_controller(&accessory, record);
            }
            (None, true) => {
                debug!(
                    lock = %record.description,
                    endpoint = record.endpoint_id,
                    "endpoint hidden, not registering"
                );
            }
        }
    }

    fn start_controller(&mut self, accessory: &PlatformAccessory, record: &LockRecord) {
        let (handle, tasks) = LockController::spawn(
            Arc::clone(&self.api),
            record,
            &accessory.context,
            ControllerSettings::from(&self.config.options),
            self.cancel.child_token(),
        );

        self.host.bind(accessory, handle.clone());
        self.handles.push(handle);
        self.tasks.extend(tasks);
    }

    /// Stop every controller and wait for its tasks to finish.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "controller task ended abnormally");
            }
        }
        self.handles.clear();
        debug!("platform stopped");
    }
}

// ── Lock controller ──
//
// One controller per lock. Two long-lived tasks share its state:
//
//   poll task     fixed-interval status refresh, skipped while a command
//                 sequence is in flight
//   command task  debounces set_state calls, then sends one lock/unlock
//                 for the latest target and confirms it with a poll
//
// State is published through a `watch` channel so hosts can read the
// latest snapshot or await changes. Failures are logged and swallowed;
// the last good snapshot stays visible.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use yalehub_api::LockRecord;

use crate::api::HubApi;
use crate::config::Options;
use crate::error::CoreError;
use crate::model::{AccessoryContext, LockSnapshot, LockTargetState};

/// Timing for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Status poll interval; also the delay before the post-command re-poll.
    pub refresh_rate: Duration,
    /// Debounce window for set_state bursts.
    pub push_rate: Duration,
}

impl From<&Options> for ControllerSettings {
    fn from(options: &Options) -> Self {
        Self {
            refresh_rate: options.refresh_rate,
            push_rate: options.push_rate,
        }
    }
}

/// State shared between a handle and its controller tasks.
struct LockShared {
    endpoint_id: i64,
    name: String,
    state: watch::Sender<LockSnapshot>,
    /// Raised when a burst is picked up, lowered after its confirm poll.
    in_flight: AtomicBool,
    /// Targets sent but not yet taken by the command task.
    queued: AtomicUsize,
}

impl LockShared {
    /// Polls are skipped while a burst runs or another target waits.
    fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) || self.queued.load(Ordering::SeqCst) > 0
    }
}

// ── Handle ───────────────────────────────────────────────────────────

/// Host-facing view of one lock: read state, request a new target.
#[derive(Clone)]
pub struct LockHandle {
    shared: Arc<LockShared>,
    commands: mpsc::UnboundedSender<LockTargetState>,
}

impl std::fmt::Debug for LockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockHandle")
            .field("endpoint_id", &self.shared.endpoint_id)
            .field("name", &self.shared.name)
            .finish_non_exhaustive()
    }
}

impl LockHandle {
    pub fn endpoint_id(&self) -> i64 {
        self.shared.endpoint_id
    }

    /// Latest published snapshot.
    pub fn get_state(&self) -> LockSnapshot {
        self.shared.state.borrow().clone()
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<LockSnapshot> {
        self.shared.state.subscribe()
    }

    /// Whether a command sequence is pending or running.
    pub fn is_busy(&self) -> bool {
        self.shared.is_busy()
    }

    /// Record a desired state. The command itself is sent once the
    /// debounce window closes without a newer request.
    pub fn set_state(&self, target: LockTargetState) -> Result<(), CoreError> {
        if self.commands.is_closed() {
            return Err(CoreError::ControllerStopped {
                endpoint_id: self.shared.endpoint_id,
            });
        }

        let current = self.shared.state.borrow().current;
        self.shared.queued.fetch_add(1, Ordering::SeqCst);
        self.shared.state.send_modify(|s| s.target = target);
        info!(
            lock = %self.shared.name,
            target = %target,
            "{} was {}",
            self.shared.name,
            current.verb()
        );

        if self.commands.send(target).is_err() {
            self.shared.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(CoreError::ControllerStopped {
                endpoint_id: self.shared.endpoint_id,
            });
        }
        Ok(())
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// Keeps one lock in sync with the cloud.
pub struct LockController<A> {
    api: Arc<A>,
    shared: Arc<LockShared>,
    settings: ControllerSettings,
    cancel: CancellationToken,
}

impl<A> Clone for LockController<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            shared: Arc::clone(&self.shared),
            settings: self.settings,
            cancel: self.cancel.clone(),
        }
    }
}

impl<A: HubApi> LockController<A> {
    /// Start the poll and command tasks for a lock.
    ///
    /// Initial state comes from the restored context. The first poll runs
    /// immediately. Both tasks stop when `cancel` fires.
    pub fn spawn(
        api: Arc<A>,
        record: &LockRecord,
        context: &AccessoryContext,
        settings: ControllerSettings,
        cancel: CancellationToken,
    ) -> (LockHandle, Vec<JoinHandle<()>>) {
        let (state, _) = watch::channel(LockSnapshot::restore(context));
        let shared = Arc::new(LockShared {
            endpoint_id: record.endpoint_id,
            name: record.description.clone(),
            state,
            in_flight: AtomicBool::new(false),
            queued: AtomicUsize::new(0),
        });
        let (tx, rx) = mpsc::unbounded_channel();

        let controller = Self {
            api,
            shared: Arc::clone(&shared),
            settings,
            cancel,
        };

        debug!(
            lock = %shared.name,
            endpoint = shared.endpoint_id,
            refresh_secs = settings.refresh_rate.as_secs(),
            push_ms = u64::try_from(settings.push_rate.as_millis()).unwrap_or(u64::MAX),
            "starting lock controller"
        );

        let handles = vec![
            tokio::spawn(poll_task(controller.clone())),
            tokio::spawn(command_task(controller, rx)),
        ];

        (
            LockHandle {
                shared,
                commands: tx,
            },
            handles,
        )
    }

    /// Fetch the lock feed and publish this lock's status.
    pub async fn refresh_status(&self) {
        let locks = match self.api.get_locks().await {
            Ok(locks) => locks,
            Err(e) if e.is_transient() => {
                warn!(
                    lock = %self.shared.name,
                    endpoint = self.shared.endpoint_id,
                    error = %e,
                    "status refresh failed, keeping last state"
                );
                return;
            }
            Err(e) => {
                error!(
                    lock = %self.shared.name,
                    endpoint = self.shared.endpoint_id,
                    error = %e,
                    "status refresh failed"
                );
                return;
            }
        };

        let Some(record) = locks
            .iter()
            .find(|l| l.endpoint_id == self.shared.endpoint_id)
        else {
            debug!(
                lock = %self.shared.name,
                endpoint = self.shared.endpoint_id,
                "lock missing from status feed"
            );
            return;
        };

        let now = Utc::now();
        self.shared.state.send_modify(|s| s.apply(record, now));
        debug!(
            lock = %self.shared.name,
            status = %record.status_name,
            low_battery = record.low_battery,
            "status refreshed"
        );
    }

    /// Send one lock or unlock command.
    async fn push_changes(&self, target: LockTargetState) {
        let endpoint_id = self.shared.endpoint_id;
        let result = match target {
            LockTargetState::Secured => self.api.lock(endpoint_id).await,
            LockTargetState::Unsecured => self.api.unlock(endpoint_id).await,
        };

        match result {
            Ok(ack) => debug!(
                lock = %self.shared.name,
                target = %target,
                result = ack.result,
                "command acknowledged"
            ),
            Err(e) => error!(
                lock = %self.shared.name,
                endpoint = endpoint_id,
                target = %target,
                error = %e,
                "command failed"
            ),
        }
    }

    /// One extra poll, a refresh interval from now, at the first tick
    /// where no command is in flight.
    fn schedule_repoll(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            let period = controller.settings.refresh_rate;
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    biased;
                    () = controller.cancel.cancelled() => return,
                    _ = interval.tick() => {
                        if controller.shared.is_busy() {
                            continue;
                        }
                        controller.refresh_status().await;
                        return;
                    }
                }
            }
        });
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Poll on a fixed interval. The first tick fires at once and serves as
/// the initial refresh.
async fn poll_task<A: HubApi>(controller: LockController<A>) {
    let mut interval = tokio::time::interval(controller.settings.refresh_rate);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = controller.cancel.cancelled() => break,
            _ = interval.tick() => {
                if controller.shared.is_busy() {
                    debug!(lock = %controller.shared.name, "command in flight, skipping poll");
                } else {
                    controller.refresh_status().await;
                }
            }
        }
    }
}

/// Debounce incoming targets, then run one command sequence at a time.
async fn command_task<A: HubApi>(
    controller: LockController<A>,
    mut rx: mpsc::UnboundedReceiver<LockTargetState>,
) {
    let push_rate = controller.settings.push_rate;

    loop {
        let mut target = tokio::select! {
            biased;
            () = controller.cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(target) => target,
                None => break,
            },
        };
        controller.shared.in_flight.store(true, Ordering::SeqCst);
        controller.shared.queued.fetch_sub(1, Ordering::SeqCst);

        // Every new request restarts the window; the latest target wins.
        loop {
            tokio::select! {
                biased;
                () = controller.cancel.cancelled() => return,
                next = rx.recv() => match next {
                    Some(newer) => {
                        controller.shared.queued.fetch_sub(1, Ordering::SeqCst);
                        target = newer;
                    }
                    None => break,
                },
                () = tokio::time::sleep(push_rate) => break,
            }
        }

        controller.push_changes(target).await;
        controller.refresh_status().await;
        controller.shared.in_flight.store(false, Ordering::SeqCst);
        controller.schedule_repoll();
    }

    debug!(lock = %controller.shared.name, "command task stopped");
}

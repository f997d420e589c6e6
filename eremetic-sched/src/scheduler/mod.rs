//! Driver callback handling for the Eremetic framework.
//!
//! [`Scheduler`] is the capability set the cluster-manager driver calls into;
//! [`EremeticScheduler`] is its one implementation.  The callbacks are thin:
//! offer matching lives in [`crate::offer`], status and message translation in
//! [`crate::translate`], and task state in [`crate::registry`].
//!
//! # Offer cycle
//! Every non-empty offer delivered to [`Scheduler::resource_offers`] is
//! resolved with exactly one driver command, either a launch or a decline.
//! Match and stage happen under one registry write guard per offer, so a task
//! staged for one offer is no longer pending when the next offer is evaluated,
//! whether that offer arrives in the same callback or on another thread.
//!
//! # Failure policy
//! No callback returns an error.  Unknown tasks, malformed executor messages,
//! failed driver commands and driver-reported errors are logged; task-level
//! failures surface as a terminal task status with a reason.
//!
//! # Example
//! ```rust
//! use eremetic_sched::config::SchedulerConfig;
//! use eremetic_sched::driver::LogDriver;
//! use eremetic_sched::offer::{Offer, OfferResources};
//! use eremetic_sched::scheduler::{EremeticScheduler, Scheduler};
//! use eremetic_sched::task::{Resources, TaskRequest, TaskStatus};
//!
//! let sched = EremeticScheduler::new(SchedulerConfig::default());
//! let id = sched.schedule_task(TaskRequest {
//!     command: "echo hello".into(),
//!     resources: Resources { cpus: 0.5, mem_mb: 64.0, ..Default::default() },
//!     ..Default::default()
//! });
//!
//! let offer = Offer {
//!     id: "o1".into(),
//!     slave_id: "s1".into(),
//!     resources: OfferResources { cpus: 1.0, mem_mb: 128.0, ..Default::default() },
//!     ..Default::default()
//! };
//! sched.resource_offers(&LogDriver, &[offer]);
//!
//! assert_eq!(sched.task_status(&id), Some(TaskStatus::Staging));
//! ```

pub mod error;
pub mod event;

pub use error::{DriverError, SchedulerError};
pub use event::{dispatch, MasterInfo, SchedulerEvent, TaskStatusUpdate};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::driver::SchedulerDriver;
use crate::offer::{match_and_build, Offer};
use crate::registry::{self, SharedRegistry, StatusUpdateOutcome, TaskRegistry};
use crate::task::{Task, TaskDescriptor, TaskId, TaskRequest, TaskStatus, TaskSummary};
use crate::translate::{parse_framework_message, translate_status, FrameworkMessage};

// ── Scheduler trait ───────────────────────────────────────────────────────────

/// Callbacks delivered by the cluster-manager driver.
///
/// Every method takes `&self`: the driver may call back from several threads.
/// Every method returns promptly and never fails.
pub trait Scheduler {
    fn registered<D: SchedulerDriver + ?Sized>(&self, driver: &D, framework_id: &str, master: &MasterInfo);

    fn reregistered<D: SchedulerDriver + ?Sized>(&self, driver: &D, master: &MasterInfo);

    fn disconnected<D: SchedulerDriver + ?Sized>(&self, driver: &D);

    fn resource_offers<D: SchedulerDriver + ?Sized>(&self, driver: &D, offers: &[Offer]);

    fn offer_rescinded<D: SchedulerDriver + ?Sized>(&self, driver: &D, offer_id: &str);

    fn status_update<D: SchedulerDriver + ?Sized>(&self, driver: &D, update: &TaskStatusUpdate);

    fn framework_message<D: SchedulerDriver + ?Sized>(
        &self,
        driver: &D,
        executor_id: &str,
        slave_id: &str,
        payload: &str,
    );

    fn slave_lost<D: SchedulerDriver + ?Sized>(&self, driver: &D, slave_id: &str);

    fn executor_lost<D: SchedulerDriver + ?Sized>(
        &self,
        driver: &D,
        executor_id: &str,
        slave_id: &str,
        exit_status: i32,
    );

    fn error<D: SchedulerDriver + ?Sized>(&self, driver: &D, message: &str);
}

// ── Connection state ──────────────────────────────────────────────────────────

/// Registration state of this framework with the cluster manager.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No registration callback received yet.
    #[default]
    Unregistered,
    Registered {
        framework_id: String,
        master: MasterInfo,
    },
    /// Lost contact with the master; launches are suspended until a
    /// (re)registration arrives.
    Disconnected { framework_id: Option<String> },
}

impl ConnectionState {
    pub fn framework_id(&self) -> Option<&str> {
        match self {
            ConnectionState::Unregistered => None,
            ConnectionState::Registered { framework_id, .. } => Some(framework_id.as_str()),
            ConnectionState::Disconnected { framework_id } => framework_id.as_deref(),
        }
    }
}

// ── EremeticScheduler ─────────────────────────────────────────────────────────

/// The Eremetic framework scheduler.
///
/// Owns the task registry (shared with readers through
/// [`registry`](Self::registry)), the connection state and the task counter.
/// `Send + Sync`.
pub struct EremeticScheduler {
    config: SchedulerConfig,
    registry: SharedRegistry,
    connection: Mutex<ConnectionState>,
    tasks_created: AtomicU64,
}

impl EremeticScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_registry(config, TaskRegistry::shared())
    }

    /// Build a scheduler around an existing registry handle.
    pub fn with_registry(config: SchedulerConfig, registry: SharedRegistry) -> Self {
        Self {
            config,
            registry,
            connection: Mutex::new(ConnectionState::Unregistered),
            tasks_created: AtomicU64::new(0),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Registry handle for external reporting.  Taking the read guard is safe
    /// while callbacks run.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Number of tasks submitted since start-up.
    pub fn tasks_created(&self) -> u64 {
        self.tasks_created.load(Ordering::SeqCst)
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection_guard().clone()
    }

    pub fn task_status(&self, id: &str) -> Option<TaskStatus> {
        registry::read(&self.registry).get(id).map(|t| t.status)
    }

    pub fn snapshot(&self) -> Vec<TaskSummary> {
        registry::read(&self.registry).snapshot()
    }

    fn connection_guard(&self) -> MutexGuard<'_, ConnectionState> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_disconnected(&self) -> bool {
        matches!(*self.connection_guard(), ConnectionState::Disconnected { .. })
    }

    // ── Caller-initiated operations ───────────────────────────────────────────

    /// Accept a task request and queue it as `pending`.
    ///
    /// Returns the generated id (`"<prefix>.<uuid>"`).
    pub fn schedule_task(&self, request: TaskRequest) -> TaskId {
        let sequence = self.tasks_created.fetch_add(1, Ordering::SeqCst);
        let id = format!("{}.{}", self.config.task_id_prefix, Uuid::new_v4());
        let task = Task::new(id.clone(), sequence, request);

        info!(
            task    = %id,
            cpus    = task.resources.cpus,
            mem_mb  = task.resources.mem_mb,
            created = sequence + 1,
            "task queued"
        );
        registry::write(&self.registry).put(task);
        id
    }

    /// Kill a task on behalf of an external caller.
    ///
    /// A task that was never launched is marked `killed` locally.  A launched
    /// task gets a kill command; its `killed` status arrives later as a status
    /// update.
    ///
    /// # Errors
    /// [`SchedulerError::UnknownTask`], [`SchedulerError::TaskTerminal`], or the
    /// driver's refusal.
    pub fn kill_task<D: SchedulerDriver + ?Sized>(&self, driver: &D, id: &str) -> Result<(), SchedulerError> {
        let mut reg = registry::write(&self.registry);
        let task = reg
            .get(id)
            .ok_or_else(|| SchedulerError::UnknownTask(id.to_string()))?;

        if task.is_terminal() {
            return Err(SchedulerError::TaskTerminal {
                task: id.to_string(),
                status: task.status,
            });
        }

        if task.is_pending() {
            reg.update_status(id, TaskStatus::Killed, Some("killed before launch".to_string()));
            info!(task = %id, "pending task killed");
            return Ok(());
        }

        driver.kill_task(id)?;
        info!(task = %id, "kill requested");
        Ok(())
    }

    /// Ask the cluster manager to resend the status of every launched task
    /// that has not finished.
    pub fn reconcile<D: SchedulerDriver + ?Sized>(&self, driver: &D) -> Result<(), SchedulerError> {
        let ids: Vec<TaskId> = registry::read(&self.registry)
            .active()
            .iter()
            .map(|t| t.id.clone())
            .collect();

        if ids.is_empty() {
            debug!("nothing to reconcile");
            return Ok(());
        }

        info!(count = ids.len(), "reconciling active tasks");
        driver.reconcile_tasks(&ids)?;
        Ok(())
    }

    /// Classify a framework message.  Untrusted senders are never parsed.
    pub fn classify_framework_message(&self, executor_id: &str, payload: &str) -> FrameworkMessage {
        parse_framework_message(executor_id, payload, &self.config.trusted_executor_id)
    }

    // ── Offer handling ────────────────────────────────────────────────────────

    /// Resolve one offer with exactly one driver command.
    fn handle_offer<D: SchedulerDriver + ?Sized>(&self, driver: &D, offer: &Offer, launches_allowed: bool) {
        if !launches_allowed {
            debug!(offer = %offer.id, "disconnected, declining offer");
            self.decline(driver, offer);
            return;
        }

        let mut reg = registry::write(&self.registry);
        let matched = {
            let pending = reg.pending();
            match_and_build(offer, &pending)
        };

        match matched {
            Some((task_id, descriptor)) => self.launch(driver, &mut reg, offer, task_id, descriptor),
            None => {
                drop(reg);
                debug!(offer = %offer.id, "no pending task fits offer");
                self.decline(driver, offer);
            }
        }
    }

    /// Issue the launch and, only once the driver accepted it, stage the task.
    fn launch<D: SchedulerDriver + ?Sized>(
        &self,
        driver: &D,
        reg: &mut TaskRegistry,
        offer: &Offer,
        task_id: TaskId,
        descriptor: TaskDescriptor,
    ) {
        let offer_ids = [offer.id.clone()];
        match driver.launch_tasks(&offer_ids, vec![descriptor], &self.config.filters) {
            Ok(status) => {
                reg.update_status(&task_id, TaskStatus::Staging, None);
                reg.set_placement(&task_id, &offer.slave_id, &offer.hostname);
                info!(
                    task  = %task_id,
                    offer = %offer.id,
                    slave = %offer.slave_id,
                    host  = %offer.hostname,
                    driver_status = ?status,
                    "✓ task launched"
                );
            }
            Err(e) => {
                error!(
                    task  = %task_id,
                    offer = %offer.id,
                    error = %e,
                    "✗ launch failed, task stays pending"
                );
            }
        }
    }

    fn decline<D: SchedulerDriver + ?Sized>(&self, driver: &D, offer: &Offer) {
        if let Err(e) = driver.decline_offer(&offer.id, &self.config.filters) {
            warn!(offer = %offer.id, error = %e, "decline failed");
        }
    }
}

// ── Scheduler impl ────────────────────────────────────────────────────────────

impl Scheduler for EremeticScheduler {
    fn registered<D: SchedulerDriver + ?Sized>(&self, _driver: &D, framework_id: &str, master: &MasterInfo) {
        info!(
            framework_id = %framework_id,
            master = %master.hostname,
            port = master.port,
            "framework registered"
        );
        *self.connection_guard() = ConnectionState::Registered {
            framework_id: framework_id.to_string(),
            master: master.clone(),
        };
    }

    fn reregistered<D: SchedulerDriver + ?Sized>(&self, driver: &D, master: &MasterInfo) {
        {
            let mut conn = self.connection_guard();
            let framework_id = conn.framework_id().unwrap_or_default().to_string();
            info!(framework_id = %framework_id, master = %master.hostname, "framework re-registered");
            *conn = ConnectionState::Registered {
                framework_id,
                master: master.clone(),
            };
        }

        // Updates may have been dropped while disconnected.
        if let Err(e) = self.reconcile(driver) {
            warn!(error = %e, "reconciliation after re-registration failed");
        }
    }

    fn disconnected<D: SchedulerDriver + ?Sized>(&self, _driver: &D) {
        let mut conn = self.connection_guard();
        let framework_id = conn.framework_id().map(str::to_string);
        warn!(framework_id = ?framework_id, "framework disconnected from master");
        *conn = ConnectionState::Disconnected { framework_id };
    }

    fn resource_offers<D: SchedulerDriver + ?Sized>(&self, driver: &D, offers: &[Offer]) {
        if offers.is_empty() {
            debug!("received empty offer list");
            return;
        }

        let launches_allowed = !self.is_disconnected();
        debug!(count = offers.len(), launches_allowed, "received offers");

        for offer in offers {
            self.handle_offer(driver, offer, launches_allowed);
        }
    }

    fn offer_rescinded<D: SchedulerDriver + ?Sized>(&self, _driver: &D, offer_id: &str) {
        info!(offer = %offer_id, "offer rescinded");
    }

    fn status_update<D: SchedulerDriver + ?Sized>(&self, _driver: &D, update: &TaskStatusUpdate) {
        let translation = translate_status(update.state);
        let reason = translation.reason.or_else(|| update.message.clone());

        let outcome = registry::write(&self.registry).update_status(
            &update.task_id,
            translation.status,
            reason.clone(),
        );

        match outcome {
            StatusUpdateOutcome::Applied => info!(
                task     = %update.task_id,
                status   = %translation.status,
                terminal = translation.terminal,
                reason   = ?reason,
                "status update"
            ),
            StatusUpdateOutcome::Unchanged => {
                debug!(task = %update.task_id, status = %translation.status, "status unchanged")
            }
            StatusUpdateOutcome::UnknownTask => {}
        }
    }

    fn framework_message<D: SchedulerDriver + ?Sized>(
        &self,
        _driver: &D,
        executor_id: &str,
        slave_id: &str,
        payload: &str,
    ) {
        match self.classify_framework_message(executor_id, payload) {
            FrameworkMessage::Parsed(msg) => info!(
                executor = %executor_id,
                slave    = %slave_id,
                message  = %msg.message,
                extra    = ?msg.extra,
                "executor message"
            ),
            FrameworkMessage::Malformed { error } => warn!(
                executor = %executor_id,
                slave    = %slave_id,
                error    = %error,
                "unparseable executor message ignored"
            ),
            FrameworkMessage::Untrusted { .. } => debug!(
                executor = %executor_id,
                slave    = %slave_id,
                "message from untrusted executor ignored"
            ),
        }
    }

    fn slave_lost<D: SchedulerDriver + ?Sized>(&self, _driver: &D, slave_id: &str) {
        warn!(slave = %slave_id, "slave lost, awaiting status updates for its tasks");
    }

    fn executor_lost<D: SchedulerDriver + ?Sized>(
        &self,
        _driver: &D,
        executor_id: &str,
        slave_id: &str,
        exit_status: i32,
    ) {
        warn!(
            executor = %executor_id,
            slave    = %slave_id,
            exit_status,
            "executor lost, awaiting status updates for its tasks"
        );
    }

    fn error<D: SchedulerDriver + ?Sized>(&self, _driver: &D, message: &str) {
        error!(message = %message, "driver reported error");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

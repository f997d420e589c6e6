/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Outbound boundary: commands the scheduler issues to the cluster-manager
//! driver.
//!
//! The driver owns all network I/O.  Its commands return promptly with the
//! driver's own status; the scheduler never waits on a cluster round-trip.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scheduler::DriverError;
use crate::task::{TaskDescriptor, TaskId};

/// Default number of seconds a declined offer's resources are withheld from
/// this framework.
pub const DEFAULT_REFUSE_SECONDS: f64 = 5.0;

/// Offer filters attached to launch and decline commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub refuse_seconds: f64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            refuse_seconds: DEFAULT_REFUSE_SECONDS,
        }
    }
}

/// Driver state reported back from a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    NotStarted,
    Running,
    Aborted,
    Stopped,
}

/// Commands accepted by the cluster-manager driver.
///
/// Implemented by the transport layer.  Methods take `&self` because
/// callbacks may be delivered from several threads.
///
/// `launch_tasks` and `kill_task` are called while the scheduler holds the
/// registry write guard, so match and stage stay atomic.  Implementations
/// must not call back into the scheduler or take the registry lock from the
/// calling thread; queue such work and deliver it after the command returns.
pub trait SchedulerDriver {
    fn launch_tasks(
        &self,
        offer_ids: &[String],
        tasks: Vec<TaskDescriptor>,
        filters: &Filters,
    ) -> Result<DriverStatus, DriverError>;

    fn decline_offer(&self, offer_id: &str, filters: &Filters) -> Result<DriverStatus, DriverError>;

    fn kill_task(&self, task_id: &str) -> Result<DriverStatus, DriverError>;

    /// Ask the cluster manager to resend the latest status of `task_ids`.
    fn reconcile_tasks(&self, task_ids: &[TaskId]) -> Result<DriverStatus, DriverError>;
}

// ── LogDriver ─────────────────────────────────────────────────────────────────

/// Driver that accepts every command and only logs it.
///
/// Used by the replay binary to dry-run a scenario without a cluster.
#[derive(Debug, Default)]
pub struct LogDriver;

impl SchedulerDriver for LogDriver {
    fn launch_tasks(
        &self,
        offer_ids: &[String],
        tasks: Vec<TaskDescriptor>,
        filters: &Filters,
    ) -> Result<DriverStatus, DriverError> {
        for t in &tasks {
            info!(
                offers = ?offer_ids,
                task   = %t.task_id,
                slave  = %t.slave_id,
                cpus   = t.resources.cpus,
                mem_mb = t.resources.mem_mb,
                ports  = ?t.ports,
                refuse_seconds = filters.refuse_seconds,
                "LaunchTasks"
            );
        }
        Ok(DriverStatus::Running)
    }

    fn decline_offer(&self, offer_id: &str, filters: &Filters) -> Result<DriverStatus, DriverError> {
        info!(offer = %offer_id, refuse_seconds = filters.refuse_seconds, "DeclineOffer");
        Ok(DriverStatus::Running)
    }

    fn kill_task(&self, task_id: &str) -> Result<DriverStatus, DriverError> {
        info!(task = %task_id, "KillTask");
        Ok(DriverStatus::Running)
    }

    fn reconcile_tasks(&self, task_ids: &[TaskId]) -> Result<DriverStatus, DriverError> {
        info!(tasks = ?task_ids, "ReconcileTasks");
        Ok(DriverStatus::Running)
    }
}

// ── Test double ───────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// One recorded driver command.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Launch {
            offer_ids: Vec<String>,
            tasks: Vec<TaskDescriptor>,
        },
        Decline {
            offer_id: String,
        },
        Kill {
            task_id: String,
        },
        Reconcile {
            task_ids: Vec<TaskId>,
        },
    }

    /// Driver that records every command; optionally fails launches.
    #[derive(Debug, Default)]
    pub struct RecordingDriver {
        calls: Mutex<Vec<Call>>,
        pub fail_launches: bool,
    }

    impl RecordingDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_launches() -> Self {
            Self {
                fail_launches: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn launches(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, Call::Launch { .. }))
                .collect()
        }

        pub fn declines(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, Call::Decline { .. }))
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl SchedulerDriver for RecordingDriver {
        fn launch_tasks(
            &self,
            offer_ids: &[String],
            tasks: Vec<TaskDescriptor>,
            _filters: &Filters,
        ) -> Result<DriverStatus, DriverError> {
            self.record(Call::Launch {
                offer_ids: offer_ids.to_vec(),
                tasks,
            });
            if self.fail_launches {
                Err(DriverError::NotRunning)
            } else {
                Ok(DriverStatus::Running)
            }
        }

        fn decline_offer(&self, offer_id: &str, _filters: &Filters) -> Result<DriverStatus, DriverError> {
            self.record(Call::Decline {
                offer_id: offer_id.to_string(),
            });
            Ok(DriverStatus::Running)
        }

        fn kill_task(&self, task_id: &str) -> Result<DriverStatus, DriverError> {
            self.record(Call::Kill {
                task_id: task_id.to_string(),
            });
            Ok(DriverStatus::Running)
        }

        fn reconcile_tasks(&self, task_ids: &[TaskId]) -> Result<DriverStatus, DriverError> {
            self.record(Call::Reconcile {
                task_ids: task_ids.to_vec(),
            });
            Ok(DriverStatus::Running)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_use_default_refuse_seconds() {
        assert_eq!(Filters::default().refuse_seconds, DEFAULT_REFUSE_SECONDS);
    }

    #[test]
    fn log_driver_accepts_every_command() {
        let d = LogDriver;
        assert_eq!(
            d.decline_offer("o1", &Filters::default()),
            Ok(DriverStatus::Running)
        );
        assert_eq!(d.launch_tasks(&[], vec![], &Filters::default()), Ok(DriverStatus::Running));
        assert_eq!(d.kill_task("t1"), Ok(DriverStatus::Running));
        assert_eq!(d.reconcile_tasks(&[]), Ok(DriverStatus::Running));
    }
}

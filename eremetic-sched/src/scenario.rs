/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Scripted replay of driver events, for dry runs without a cluster.
//!
//! ```yaml
//! tasks:
//!   - command: "echo hello"
//!     resources: { cpus: 0.5, mem_mb: 64 }
//! events:
//!   - event: registered
//!     framework_id: "fw-1"
//!   - event: resource_offers
//!     offers:
//!       - { id: o1, slave_id: s1, hostname: h1, resources: { cpus: 1, mem_mb: 128 } }
//!   - event: status_update
//!     task_id: "$0"
//!     state: TASK_RUNNING
//! ```
//!
//! Task ids are generated at submission, so status updates name tasks by
//! submission index: `$0` is the first entry under `tasks`.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::driver::SchedulerDriver;
use crate::scheduler::{dispatch, EremeticScheduler, SchedulerEvent};
use crate::task::{TaskId, TaskRequest};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub tasks: Vec<TaskRequest>,
    pub events: Vec<SchedulerEvent>,
}

impl Scenario {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse scenario YAML")
    }

    /// Submit every task, then deliver every event in order.
    ///
    /// Returns the generated task ids in submission order.
    pub fn replay<D: SchedulerDriver + ?Sized>(&self, scheduler: &EremeticScheduler, driver: &D) -> Vec<TaskId> {
        let ids: Vec<TaskId> = self
            .tasks
            .iter()
            .cloned()
            .map(|req| scheduler.schedule_task(req))
            .collect();

        for event in &self.events {
            let event = resolve_task_refs(event, &ids);
            debug!(event = ?event, "replaying event");
            dispatch(scheduler, driver, &event);
        }

        ids
    }
}

/// Replace a `$N` task reference with the N-th generated id.
fn resolve_task_refs(event: &SchedulerEvent, ids: &[TaskId]) -> SchedulerEvent {
    let SchedulerEvent::StatusUpdate(update) = event else {
        return event.clone();
    };

    let mut update = update.clone();
    if let Some(index) = update.task_id.strip_prefix('$') {
        match index.parse::<usize>().ok().and_then(|i| ids.get(i)) {
            Some(id) => update.task_id = id.clone(),
            None => warn!(reference = %update.task_id, "task reference does not name a submitted task"),
        }
    }
    SchedulerEvent::StatusUpdate(update)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::driver::testing::RecordingDriver;
    use crate::task::TaskStatus;

    const SCENARIO: &str = r#"
tasks:
  - command: "echo one"
    resources: { cpus: 0.5, mem_mb: 64 }
  - command: "echo two"
    resources: { cpus: 8, mem_mb: 64 }
events:
  - event: registered
    framework_id: "fw-1"
  - event: resource_offers
    offers:
      - { id: o1, slave_id: s1, hostname: h1, resources: { cpus: 1, mem_mb: 128 } }
  - event: status_update
    task_id: "$0"
    state: TASK_RUNNING
  - event: status_update
    task_id: "$7"
    state: TASK_FAILED
"#;

    #[test]
    fn replay_submits_tasks_and_delivers_events() {
        let scenario = Scenario::from_yaml_str(SCENARIO).unwrap();
        let sched = EremeticScheduler::new(SchedulerConfig::default());
        let driver = RecordingDriver::new();

        let ids = scenario.replay(&sched, &driver);

        assert_eq!(ids.len(), 2);
        assert_eq!(sched.task_status(&ids[0]), Some(TaskStatus::Running));
        assert_eq!(sched.task_status(&ids[1]), Some(TaskStatus::Pending));
        assert_eq!(driver.launches().len(), 1);
        assert_eq!(sched.connection().framework_id(), Some("fw-1"));
    }

    #[test]
    fn empty_scenario_is_valid() {
        let scenario = Scenario::from_yaml_str("").unwrap();
        assert!(scenario.tasks.is_empty());
        assert!(scenario.events.is_empty());
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        assert!(Scenario::from_yaml_str("offers: []\n").is_err());
    }
}

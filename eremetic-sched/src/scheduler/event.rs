/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Inbound driver events as data.
//!
//! The transport layer calls the [`Scheduler`] trait directly; this enum exists
//! for callers that queue or replay events (the binary's scenario mode) and
//! routes each one through [`dispatch`].

use serde::{Deserialize, Deserializer, Serialize};

use super::Scheduler;
use crate::driver::SchedulerDriver;
use crate::offer::Offer;
use crate::translate::WireTaskState;

/// Cluster-manager master the framework is registered with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterInfo {
    pub id: String,
    pub hostname: String,
    pub port: u32,
}

/// One task status report from the cluster manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskStatusUpdate {
    pub task_id: String,

    /// Wire state code.  Replay files may also use the `TASK_*` label.
    #[serde(deserialize_with = "deserialize_state")]
    pub state: i32,

    /// Free-text explanation attached by the agent or executor.
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub slave_id: Option<String>,
}

impl TaskStatusUpdate {
    pub fn new(task_id: impl Into<String>, state: WireTaskState) -> Self {
        Self {
            task_id: task_id.into(),
            state: state.code(),
            message: None,
            slave_id: None,
        }
    }
}

fn deserialize_state<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CodeOrLabel {
        Code(i32),
        Label(String),
    }

    match CodeOrLabel::deserialize(deserializer)? {
        CodeOrLabel::Code(code) => Ok(code),
        CodeOrLabel::Label(label) => WireTaskState::from_label(&label)
            .map(WireTaskState::code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown task state label '{label}'"))),
    }
}

/// Every callback the driver can deliver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    Registered {
        framework_id: String,
        #[serde(default)]
        master: MasterInfo,
    },
    Reregistered {
        #[serde(default)]
        master: MasterInfo,
    },
    Disconnected,
    ResourceOffers {
        #[serde(default)]
        offers: Vec<Offer>,
    },
    OfferRescinded {
        offer_id: String,
    },
    StatusUpdate(TaskStatusUpdate),
    FrameworkMessage {
        executor_id: String,
        #[serde(default)]
        slave_id: String,
        payload: String,
    },
    SlaveLost {
        slave_id: String,
    },
    ExecutorLost {
        executor_id: String,
        #[serde(default)]
        slave_id: String,
        #[serde(default)]
        exit_status: i32,
    },
    Error {
        message: String,
    },
}

/// Route `event` to the matching [`Scheduler`] callback.
pub fn dispatch<S, D>(scheduler: &S, driver: &D, event: &SchedulerEvent)
where
    S: Scheduler,
    D: SchedulerDriver + ?Sized,
{
    match event {
        SchedulerEvent::Registered {
            framework_id,
            master,
        } => scheduler.registered(driver, framework_id, master),
        SchedulerEvent::Reregistered { master } => scheduler.reregistered(driver, master),
        SchedulerEvent::Disconnected => scheduler.disconnected(driver),
        SchedulerEvent::ResourceOffers { offers } => scheduler.resource_offers(driver, offers),
        SchedulerEvent::OfferRescinded { offer_id } => scheduler.offer_rescinded(driver, offer_id),
        SchedulerEvent::StatusUpdate(update) => scheduler.status_update(driver, update),
        SchedulerEvent::FrameworkMessage {
            executor_id,
            slave_id,
            payload,
        } => scheduler.framework_message(driver, executor_id, slave_id, payload),
        SchedulerEvent::SlaveLost { slave_id } => scheduler.slave_lost(driver, slave_id),
        SchedulerEvent::ExecutorLost {
            executor_id,
            slave_id,
            exit_status,
        } => scheduler.executor_lost(driver, executor_id, slave_id, *exit_status),
        SchedulerEvent::Error { message } => scheduler.error(driver, message),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_deserialise_from_yaml() {
        let yaml = r#"
- event: registered
  framework_id: "1234"
- event: resource_offers
  offers:
    - id: o1
      slave_id: s1
      hostname: h1
      resources: { cpus: 1.0, mem_mb: 128 }
- event: status_update
  task_id: eremetic-task.1
  state: TASK_FAILED
  message: exit 1
- event: status_update
  task_id: eremetic-task.1
  state: 1
- event: disconnected
- event: executor_lost
  executor_id: eremetic-executor
  exit_status: 2
"#;
        let events: Vec<SchedulerEvent> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(events.len(), 6);
        assert!(matches!(&events[0], SchedulerEvent::Registered { framework_id, .. } if framework_id == "1234"));
        match &events[1] {
            SchedulerEvent::ResourceOffers { offers } => {
                assert_eq!(offers[0].resources.mem_mb, 128.0);
            }
            other => panic!("expected offers, got {other:?}"),
        }
        assert_eq!(
            events[2],
            SchedulerEvent::StatusUpdate(TaskStatusUpdate {
                task_id: "eremetic-task.1".into(),
                state: WireTaskState::Failed.code(),
                message: Some("exit 1".into()),
                slave_id: None,
            })
        );
        assert!(matches!(&events[3], SchedulerEvent::StatusUpdate(u) if u.state == 1));
        assert_eq!(events[4], SchedulerEvent::Disconnected);
    }

    #[test]
    fn unknown_state_label_is_rejected() {
        let yaml = "event: status_update\ntask_id: t1\nstate: TASK_EXPLODED\n";
        assert!(serde_yaml::from_str::<SchedulerEvent>(yaml).is_err());
    }
}

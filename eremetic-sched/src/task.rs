/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the Eremetic scheduler.
//!
//! Two distinct types model the two sides of the launch pipeline:
//!
//! ```text
//! submitter ──(TaskRequest)──►  Task  ──(offer evaluator)──►  TaskDescriptor  ──(driver)──►  cluster
//!                                ↑ registry record               ↑ launch-scoped, per offer
//!                                lives for the process           built once, handed to the driver
//! ```
//!
//! # Ownership model
//! A `Task` is **owned** by the [`TaskRegistry`](crate::registry::TaskRegistry)
//! from the moment it is submitted.  Only the scheduler callbacks mutate it,
//! and only through the registry's guarded status transition.  A
//! `TaskDescriptor` is a value copy built for one launch command and never
//! written back.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Globally unique task identifier (`"<prefix>.<uuid>"`).
pub type TaskId = String;

// ── Task status ───────────────────────────────────────────────────────────────

/// Internal task status vocabulary.
///
/// ```text
/// pending → staging → running → { finished, failed, killed, lost, error }
/// ```
///
/// Terminal statuses may also be reached directly from `pending` or `staging`
/// when the cluster manager reports a fast failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Submitted, waiting for a fitting offer.
    #[default]
    Pending,
    /// Launch command issued, not yet confirmed running.
    Staging,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
    /// Unrecoverable error, including unrecognised wire status codes.
    Error,
}

impl TaskStatus {
    /// Returns `true` for statuses that end a task's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Finished
                | TaskStatus::Failed
                | TaskStatus::Killed
                | TaskStatus::Lost
                | TaskStatus::Error
        )
    }

    /// Label in the cluster manager's naming scheme (`TASK_FAILED`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "TASK_PENDING",
            TaskStatus::Staging => "TASK_STAGING",
            TaskStatus::Running => "TASK_RUNNING",
            TaskStatus::Finished => "TASK_FINISHED",
            TaskStatus::Failed => "TASK_FAILED",
            TaskStatus::Killed => "TASK_KILLED",
            TaskStatus::Lost => "TASK_LOST",
            TaskStatus::Error => "TASK_ERROR",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Resources ─────────────────────────────────────────────────────────────────

/// Resource shape requested by a task.
///
/// Scalar quantities use the cluster manager's units (CPU shares, MB).  Ports
/// are requested by count; concrete port numbers are picked from the offer at
/// launch time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub cpus: f64,
    pub mem_mb: f64,
    pub disk_mb: f64,
    pub ports: u32,
}

/// Node attribute constraint: the offer must carry `attribute` with exactly
/// `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaveConstraint {
    pub attribute: String,
    pub value: String,
}

// ── TaskRequest (submission input) ────────────────────────────────────────────

/// What an external submitter hands to
/// [`EremeticScheduler::schedule_task`](crate::scheduler::EremeticScheduler::schedule_task).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRequest {
    pub name: String,
    pub resources: Resources,
    pub command: String,
    pub image: Option<String>,
    pub env: BTreeMap<String, String>,
    pub constraints: Vec<SlaveConstraint>,
}

// ── Task (registry record) ────────────────────────────────────────────────────

/// One applied status transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEntry {
    pub status: TaskStatus,
    pub reason: Option<String>,
    pub time: DateTime<Utc>,
}

/// Registry record for one unit of work.
///
/// # Lifecycle
/// Created from a [`TaskRequest`] in `pending`, moved to `staging` by the
/// callback handler once a launch command has been accepted by the driver,
/// then driven by status updates only.  The core never removes a record.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    // ── Identity ──────────────────────────────────────────────────────────────
    pub id: TaskId,
    pub name: String,

    /// Submission ordinal.  Pending tasks are offered oldest (lowest) first.
    pub sequence: u64,

    // ── Request ───────────────────────────────────────────────────────────────
    pub resources: Resources,
    pub command: String,
    pub image: Option<String>,
    pub env: BTreeMap<String, String>,
    pub constraints: Vec<SlaveConstraint>,

    // ── State ─────────────────────────────────────────────────────────────────
    pub status: TaskStatus,
    pub reason: Option<String>,
    pub history: Vec<StatusEntry>,

    /// Node the task was launched on.  `None` while pending.
    pub slave_id: Option<String>,
    pub hostname: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh `pending` record.
    pub fn new(id: impl Into<TaskId>, sequence: u64, request: TaskRequest) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: request.name,
            sequence,
            resources: request.resources,
            command: request.command,
            image: request.image,
            env: request.env,
            constraints: request.constraints,
            status: TaskStatus::Pending,
            reason: None,
            history: vec![StatusEntry {
                status: TaskStatus::Pending,
                reason: None,
                time: now,
            }],
            slave_id: None,
            hostname: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ── TaskDescriptor (launch output) ────────────────────────────────────────────

/// Launch-scoped description of a task bound to one offer.
///
/// `resources` is the task's own request, not the whole offer; whatever the
/// offer had left over goes back to the cluster manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDescriptor {
    pub task_id: TaskId,
    pub name: String,
    pub slave_id: String,
    pub hostname: String,
    pub resources: Resources,
    /// Concrete ports reserved from the offer's ranges.
    pub ports: Vec<u32>,
    pub command: String,
    pub image: Option<String>,
    pub env: BTreeMap<String, String>,
}

/// Read-only view of one task for external reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub status: TaskStatus,
    pub reason: Option<String>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! In-memory task registry: the single source of truth for which tasks exist
//! and what state they are in.
//!
//! The registry itself is plain data.  Sharing happens through
//! [`SharedRegistry`], an `Arc<RwLock<_>>` owned by the scheduler and handed to
//! reporting code by reference.  Read-modify-write sequences (look up then
//! transition, match then stage) must run under a single write guard; see
//! [`write`] and [`read`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, warn};

use crate::task::{StatusEntry, Task, TaskStatus, TaskSummary};

/// Registry handle shared between the callback handler and external readers.
pub type SharedRegistry = Arc<RwLock<TaskRegistry>>;

/// Acquire the read guard, recovering from poisoning.
///
/// A callback that panicked mid-update leaves the map structurally valid, so
/// the data is still served rather than wedging every later callback.
pub fn read(registry: &SharedRegistry) -> RwLockReadGuard<'_, TaskRegistry> {
    registry.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquire the write guard, recovering from poisoning.
pub fn write(registry: &SharedRegistry) -> RwLockWriteGuard<'_, TaskRegistry> {
    registry.write().unwrap_or_else(PoisonError::into_inner)
}

// ── StatusUpdateOutcome ───────────────────────────────────────────────────────

/// Result of [`TaskRegistry::update_status`].
///
/// Never an error: every case is logged and absorbed by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdateOutcome {
    /// The new status was recorded.
    Applied,
    /// Same status and reason as already stored; nothing changed.
    Unchanged,
    /// No task with that id is tracked.
    UnknownTask,
}

// ── TaskRegistry ──────────────────────────────────────────────────────────────

/// Task id → [`Task`] map.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Task>,
    /// `(sequence, id)` of every pending task, so offer matching walks only
    /// the pending set in submission order.
    pending: BTreeSet<(u64, String)>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh registry in a [`SharedRegistry`].
    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Insert or replace the record for `task.id`.
    pub fn put(&mut self, task: Task) {
        debug!(task = %task.id, status = %task.status, "registry put");
        if let Some(old) = self.tasks.remove(&task.id) {
            self.pending.remove(&(old.sequence, old.id));
        }
        if task.is_pending() {
            self.pending.insert((task.sequence, task.id.clone()));
        }
        self.tasks.insert(task.id.clone(), task);
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Apply a status transition for `id`.
    ///
    /// The last update received wins.  An exact repeat of the stored status
    /// (with no new reason) is a no-op, and an unknown id is logged and
    /// ignored.
    pub fn update_status(
        &mut self,
        id: &str,
        status: TaskStatus,
        reason: Option<String>,
    ) -> StatusUpdateOutcome {
        let Some(task) = self.tasks.get_mut(id) else {
            warn!(task = %id, status = %status, "status update for untracked task ignored");
            return StatusUpdateOutcome::UnknownTask;
        };

        let current = task.status;
        if current == status && (reason.is_none() || task.reason == reason) {
            debug!(task = %id, status = %status, "duplicate status update");
            return StatusUpdateOutcome::Unchanged;
        }

        if current == status {
            debug!(task = %id, status = %status, from = ?task.reason, to = ?reason, "status reason changed");
        } else if current.is_terminal() {
            warn!(task = %id, from = %current, to = %status, "task left a terminal status");
        }

        let now = Utc::now();
        task.status = status;
        task.reason = reason.clone();
        task.updated_at = now;
        task.history.push(StatusEntry {
            status,
            reason,
            time: now,
        });

        let key = (task.sequence, task.id.clone());
        if status == TaskStatus::Pending {
            self.pending.insert(key);
        } else {
            self.pending.remove(&key);
        }

        debug!(task = %id, from = %current, to = %status, "status applied");
        StatusUpdateOutcome::Applied
    }

    /// Record the node a task was launched on.  No-op for unknown ids.
    pub fn set_placement(&mut self, id: &str, slave_id: &str, hostname: &str) {
        if let Some(task) = self.tasks.get_mut(id) {
            task.slave_id = Some(slave_id.to_string());
            task.hostname = Some(hostname.to_string());
        }
    }

    /// Pending tasks, oldest submission first.
    pub fn pending(&self) -> Vec<&Task> {
        self.pending
            .iter()
            .filter_map(|(_, id)| self.tasks.get(id))
            .collect()
    }

    /// Tasks that were handed to the cluster and have not finished yet.
    pub fn active(&self) -> Vec<&Task> {
        let mut active: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| !t.is_pending() && !t.is_terminal())
            .collect();
        active.sort_unstable_by_key(|t| t.sequence);
        active
    }

    /// Id → status/reason view, sorted by id.
    pub fn snapshot(&self) -> Vec<TaskSummary> {
        let mut out: Vec<TaskSummary> = self
            .tasks
            .values()
            .map(|t| TaskSummary {
                id: t.id.clone(),
                status: t.status,
                reason: t.reason.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Number of tasks per status.
    pub fn count_by_status(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for task in self.tasks.values() {
            *counts.entry(task.status.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

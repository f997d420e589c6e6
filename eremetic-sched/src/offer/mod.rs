/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Offer evaluation: pick the first pending task that fits an offer and build
//! its launch descriptor.
//!
//! # Policy
//! First-fit over pending tasks in the order the caller supplies (the registry
//! hands them out oldest-submission-first).  No bin-packing: the same offer
//! and the same pending set always produce the same choice, which keeps
//! declines predictable for operators.
//!
//! The evaluator is pure.  It never touches the registry; the callback handler
//! marks the chosen task `staging` only after the driver has accepted the
//! launch command.

pub mod fit;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::task::{Task, TaskDescriptor, TaskId};

pub use fit::{check_fit, MismatchReason};

// ── Offer ─────────────────────────────────────────────────────────────────────

/// Inclusive port range as offered by the cluster manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub begin: u32,
    pub end: u32,
}

impl PortRange {
    /// Number of ports in the range.  An inverted range is empty.
    pub fn len(&self) -> u64 {
        if self.end < self.begin {
            0
        } else {
            u64::from(self.end - self.begin) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resource vector carried by an offer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferResources {
    pub cpus: f64,
    pub mem_mb: f64,
    pub disk_mb: f64,
    pub ports: Vec<PortRange>,
}

impl OfferResources {
    /// Total number of ports across all ranges.
    pub fn port_count(&self) -> u64 {
        self.ports.iter().map(PortRange::len).sum()
    }
}

/// A time-bounded grant of resources on one node.
///
/// Valid only for the callback that delivered it: an offer that is not used
/// there must be declined.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Offer {
    pub id: String,
    pub slave_id: String,
    pub hostname: String,
    pub resources: OfferResources,
    pub attributes: BTreeMap<String, String>,
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Select the first task in `pending` that fits `offer` and build its launch
/// descriptor.
///
/// Returns `None` when nothing fits; the caller declines the offer.
pub fn match_and_build(offer: &Offer, pending: &[&Task]) -> Option<(TaskId, TaskDescriptor)> {
    for task in pending {
        match check_fit(offer, task) {
            Ok(()) => {
                debug!(offer = %offer.id, task = %task.id, "task fits offer");
                return Some((task.id.clone(), build_descriptor(offer, task)));
            }
            Err(reason) => {
                debug!(offer = %offer.id, task = %task.id, %reason, "task does not fit offer");
            }
        }
    }
    None
}

/// Bind `task` to `offer`.
///
/// Reserves exactly the task's request.  Ports are taken lowest-first from the
/// offer's ranges; callers must have checked the fit beforehand.
pub fn build_descriptor(offer: &Offer, task: &Task) -> TaskDescriptor {
    TaskDescriptor {
        task_id: task.id.clone(),
        name: task.name.clone(),
        slave_id: offer.slave_id.clone(),
        hostname: offer.hostname.clone(),
        resources: task.resources,
        ports: pick_ports(&offer.resources.ports, task.resources.ports),
        command: task.command.clone(),
        image: task.image.clone(),
        env: task.env.clone(),
    }
}

fn pick_ports(ranges: &[PortRange], count: u32) -> Vec<u32> {
    ranges
        .iter()
        .filter(|r| !r.is_empty())
        .flat_map(|r| r.begin..=r.end)
        .take(count as usize)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

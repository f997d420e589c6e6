/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-dimension fit check between one task request and one offer.
//!
//! Each resource dimension is compared independently; the first dimension
//! that does not fit is reported as a [`MismatchReason`] so the evaluator can
//! log exactly why a pending task was passed over.

use std::fmt;

use super::Offer;
use crate::task::Task;

/// Tolerance for floating-point resource comparison.  Offers and requests
/// travel as doubles, so an offer that equals a request must not lose to
/// rounding.
pub const RESOURCE_EPSILON: f64 = 1e-6;

/// Why a task does not fit an offer.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchReason {
    InsufficientCpus { required: f64, offered: f64 },
    InsufficientMem { required_mb: f64, offered_mb: f64 },
    InsufficientDisk { required_mb: f64, offered_mb: f64 },
    InsufficientPorts { required: u32, offered: u64 },

    /// The offer lacks the attribute, or carries a different value.
    ConstraintUnmet {
        attribute: String,
        required: String,
        offered: Option<String>,
    },
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::InsufficientCpus { required, offered } => {
                write!(f, "needs {required} cpus, offer has {offered}")
            }
            MismatchReason::InsufficientMem {
                required_mb,
                offered_mb,
            } => write!(f, "needs {required_mb}MB memory, offer has {offered_mb}MB"),
            MismatchReason::InsufficientDisk {
                required_mb,
                offered_mb,
            } => write!(f, "needs {required_mb}MB disk, offer has {offered_mb}MB"),
            MismatchReason::InsufficientPorts { required, offered } => {
                write!(f, "needs {required} ports, offer has {offered}")
            }
            MismatchReason::ConstraintUnmet {
                attribute,
                required,
                offered: Some(offered),
            } => write!(f, "constraint {attribute}={required} unmet (offer has {offered})"),
            MismatchReason::ConstraintUnmet {
                attribute,
                required,
                offered: None,
            } => write!(f, "constraint {attribute}={required} unmet (attribute absent)"),
        }
    }
}

fn fits(required: f64, offered: f64) -> bool {
    required <= offered + RESOURCE_EPSILON
}

/// Check whether `task` can run on `offer`.
///
/// Checks (in order): cpus, memory, disk, port count, then every attribute
/// constraint.
pub fn check_fit(offer: &Offer, task: &Task) -> Result<(), MismatchReason> {
    let want = &task.resources;
    let have = &offer.resources;

    if !fits(want.cpus, have.cpus) {
        return Err(MismatchReason::InsufficientCpus {
            required: want.cpus,
            offered: have.cpus,
        });
    }
    if !fits(want.mem_mb, have.mem_mb) {
        return Err(MismatchReason::InsufficientMem {
            required_mb: want.mem_mb,
            offered_mb: have.mem_mb,
        });
    }
    if !fits(want.disk_mb, have.disk_mb) {
        return Err(MismatchReason::InsufficientDisk {
            required_mb: want.disk_mb,
            offered_mb: have.disk_mb,
        });
    }

    let port_count = have.port_count();
    if u64::from(want.ports) > port_count {
        return Err(MismatchReason::InsufficientPorts {
            required: want.ports,
            offered: port_count,
        });
    }

    for c in &task.constraints {
        let offered = offer.attributes.get(&c.attribute);
        if offered != Some(&c.value) {
            return Err(MismatchReason::ConstraintUnmet {
                attribute: c.attribute.clone(),
                required: c.value.clone(),
                offered: offered.cloned(),
            });
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::{OfferResources, PortRange};
    use crate::task::{Resources, SlaveConstraint, TaskRequest};

    fn offer(cpus: f64, mem_mb: f64, disk_mb: f64, ports: Vec<PortRange>) -> Offer {
        Offer {
            id: "o1".into(),
            slave_id: "s1".into(),
            hostname: "h1".into(),
            resources: OfferResources {
                cpus,
                mem_mb,
                disk_mb,
                ports,
            },
            attributes: Default::default(),
        }
    }

    fn task(cpus: f64, mem_mb: f64, disk_mb: f64, ports: u32) -> Task {
        Task::new(
            "t1",
            0,
            TaskRequest {
                resources: Resources {
                    cpus,
                    mem_mb,
                    disk_mb,
                    ports,
                },
                ..Default::default()
            },
        )
    }

    #[test]
    fn exact_match_fits() {
        let o = offer(0.1, 32.0, 0.0, vec![]);
        assert_eq!(check_fit(&o, &task(0.1, 32.0, 0.0, 0)), Ok(()));
    }

    #[test]
    fn each_dimension_is_checked_independently() {
        let o = offer(1.0, 128.0, 64.0, vec![PortRange { begin: 31000, end: 31001 }]);

        assert!(matches!(
            check_fit(&o, &task(2.0, 1.0, 0.0, 0)),
            Err(MismatchReason::InsufficientCpus { .. })
        ));
        assert!(matches!(
            check_fit(&o, &task(0.5, 256.0, 0.0, 0)),
            Err(MismatchReason::InsufficientMem { .. })
        ));
        assert!(matches!(
            check_fit(&o, &task(0.5, 64.0, 65.0, 0)),
            Err(MismatchReason::InsufficientDisk { .. })
        ));
        assert!(matches!(
            check_fit(&o, &task(0.5, 64.0, 0.0, 3)),
            Err(MismatchReason::InsufficientPorts { required: 3, offered: 2 })
        ));
        assert_eq!(check_fit(&o, &task(0.5, 64.0, 64.0, 2)), Ok(()));
    }

    #[test]
    fn zero_resource_offer_rejects_non_trivial_task() {
        let o = offer(0.0, 0.0, 0.0, vec![]);
        assert!(check_fit(&o, &task(0.1, 0.0, 0.0, 0)).is_err());
    }

    #[test]
    fn constraints_must_match_attribute_values() {
        let mut o = offer(1.0, 128.0, 0.0, vec![]);
        o.attributes.insert("rack".into(), "r1".into());

        let mut t = task(0.5, 64.0, 0.0, 0);
        t.constraints.push(SlaveConstraint {
            attribute: "rack".into(),
            value: "r1".into(),
        });
        assert_eq!(check_fit(&o, &t), Ok(()));

        t.constraints[0].value = "r2".into();
        let err = check_fit(&o, &t).unwrap_err();
        assert_eq!(err.to_string(), "constraint rack=r2 unmet (offer has r1)");

        t.constraints[0].attribute = "zone".into();
        assert!(matches!(
            check_fit(&o, &t),
            Err(MismatchReason::ConstraintUnmet { offered: None, .. })
        ));
    }
}

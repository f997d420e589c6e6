/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Wire task-state codes and their mapping onto [`TaskStatus`].

use crate::task::TaskStatus;

/// Task-state codes as sent by the cluster manager.
///
/// The integer values are fixed by the wire protocol; they are not ordered by
/// lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireTaskState {
    Starting,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
    Staging,
    Error,
    Killing,
    Dropped,
    Unreachable,
    Gone,
    GoneByOperator,
    Unknown,
}

impl WireTaskState {
    /// Parse a wire code.  Returns `None` for codes this build does not know.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => WireTaskState::Starting,
            1 => WireTaskState::Running,
            2 => WireTaskState::Finished,
            3 => WireTaskState::Failed,
            4 => WireTaskState::Killed,
            5 => WireTaskState::Lost,
            6 => WireTaskState::Staging,
            7 => WireTaskState::Error,
            8 => WireTaskState::Killing,
            9 => WireTaskState::Dropped,
            10 => WireTaskState::Unreachable,
            11 => WireTaskState::Gone,
            12 => WireTaskState::GoneByOperator,
            13 => WireTaskState::Unknown,
            _ => return None,
        })
    }

    pub fn code(self) -> i32 {
        match self {
            WireTaskState::Starting => 0,
            WireTaskState::Running => 1,
            WireTaskState::Finished => 2,
            WireTaskState::Failed => 3,
            WireTaskState::Killed => 4,
            WireTaskState::Lost => 5,
            WireTaskState::Staging => 6,
            WireTaskState::Error => 7,
            WireTaskState::Killing => 8,
            WireTaskState::Dropped => 9,
            WireTaskState::Unreachable => 10,
            WireTaskState::Gone => 11,
            WireTaskState::GoneByOperator => 12,
            WireTaskState::Unknown => 13,
        }
    }

    /// Parse the `TASK_*` label form used in logs and replay files.
    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "TASK_STARTING" => WireTaskState::Starting,
            "TASK_RUNNING" => WireTaskState::Running,
            "TASK_FINISHED" => WireTaskState::Finished,
            "TASK_FAILED" => WireTaskState::Failed,
            "TASK_KILLED" => WireTaskState::Killed,
            "TASK_LOST" => WireTaskState::Lost,
            "TASK_STAGING" => WireTaskState::Staging,
            "TASK_ERROR" => WireTaskState::Error,
            "TASK_KILLING" => WireTaskState::Killing,
            "TASK_DROPPED" => WireTaskState::Dropped,
            "TASK_UNREACHABLE" => WireTaskState::Unreachable,
            "TASK_GONE" => WireTaskState::Gone,
            "TASK_GONE_BY_OPERATOR" => WireTaskState::GoneByOperator,
            "TASK_UNKNOWN" => WireTaskState::Unknown,
            _ => return None,
        })
    }

    /// Internal status for this wire state.
    ///
    /// `Unknown` is the cluster manager admitting it has lost track of the
    /// task; it is surfaced as `error` rather than guessed at.
    pub fn to_status(self) -> TaskStatus {
        match self {
            WireTaskState::Staging | WireTaskState::Starting => TaskStatus::Staging,
            WireTaskState::Running | WireTaskState::Killing => TaskStatus::Running,
            WireTaskState::Finished => TaskStatus::Finished,
            WireTaskState::Failed => TaskStatus::Failed,
            WireTaskState::Killed => TaskStatus::Killed,
            WireTaskState::Error | WireTaskState::Unknown => TaskStatus::Error,
            WireTaskState::Lost
            | WireTaskState::Dropped
            | WireTaskState::Unreachable
            | WireTaskState::Gone
            | WireTaskState::GoneByOperator => TaskStatus::Lost,
        }
    }
}

/// Outcome of translating one wire status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub status: TaskStatus,
    pub terminal: bool,
    /// Set when the translator itself has something to say (unrecognised code).
    pub reason: Option<String>,
}

/// Map a wire status code to an internal status.
///
/// Unrecognised codes become a terminal `error` with a reason naming the
/// code: a protocol mismatch must show up on the task, not vanish.
pub fn translate_status(code: i32) -> Translation {
    match WireTaskState::from_code(code) {
        Some(WireTaskState::Unknown) => Translation {
            status: TaskStatus::Error,
            terminal: true,
            reason: Some("cluster manager reports task state unknown".to_string()),
        },
        Some(state) => {
            let status = state.to_status();
            Translation {
                status,
                terminal: status.is_terminal(),
                reason: None,
            }
        }
        None => Translation {
            status: TaskStatus::Error,
            terminal: true,
            reason: Some(format!("unrecognized task state code {code}")),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips_for_every_known_state() {
        for code in 0..=13 {
            let state = WireTaskState::from_code(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert!(WireTaskState::from_code(14).is_none());
        assert!(WireTaskState::from_code(-1).is_none());
    }

    #[test]
    fn failed_code_translates_to_terminal_failed() {
        let t = translate_status(WireTaskState::Failed.code());
        assert_eq!(t.status, TaskStatus::Failed);
        assert!(t.terminal);
        assert!(t.reason.is_none());
    }

    #[test]
    fn live_states_collapse_onto_staging_and_running() {
        assert_eq!(translate_status(0).status, TaskStatus::Staging);
        assert_eq!(translate_status(6).status, TaskStatus::Staging);
        assert_eq!(translate_status(1).status, TaskStatus::Running);
        assert_eq!(translate_status(8).status, TaskStatus::Running);
        assert!(!translate_status(1).terminal);
    }

    #[test]
    fn vanished_task_states_become_lost() {
        for state in [
            WireTaskState::Lost,
            WireTaskState::Dropped,
            WireTaskState::Unreachable,
            WireTaskState::Gone,
            WireTaskState::GoneByOperator,
        ] {
            assert_eq!(translate_status(state.code()).status, TaskStatus::Lost);
        }
    }

    #[test]
    fn unrecognised_code_is_terminal_error_with_reason() {
        let t = translate_status(42);
        assert_eq!(t.status, TaskStatus::Error);
        assert!(t.terminal);
        assert_eq!(t.reason.as_deref(), Some("unrecognized task state code 42"));
    }

    #[test]
    fn unknown_state_is_terminal_error() {
        let t = translate_status(WireTaskState::Unknown.code());
        assert_eq!(t.status, TaskStatus::Error);
        assert!(t.reason.is_some());
    }

    #[test]
    fn labels_parse() {
        assert_eq!(
            WireTaskState::from_label("TASK_FAILED"),
            Some(WireTaskState::Failed)
        );
        assert_eq!(WireTaskState::from_label("failed"), None);
    }
}

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the Eremetic scheduler.
//!
//! * [`DriverError`]: a command sent to the cluster-manager driver failed.
//! * [`SchedulerError`]: returned from operations invoked by external
//!   callers ([`kill_task`](super::EremeticScheduler::kill_task)).
//!
//! Driver callbacks never return either type: callback failures are logged
//! and absorbed, or recorded as a task status.

use thiserror::Error;

use crate::task::TaskStatus;

/// A driver command could not be issued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriverError {
    /// The driver is stopped or aborted and accepts no commands.
    #[error("driver is not running")]
    NotRunning,

    /// The driver refused the command.
    #[error("driver rejected command: {0}")]
    Rejected(String),
}

/// Top-level error type for caller-initiated scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("task '{0}' is not tracked by this scheduler")]
    UnknownTask(String),

    /// The task already reached a terminal status; there is nothing to act on.
    #[error("task '{task}' already finished with status {status}")]
    TaskTerminal { task: String, status: TaskStatus },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_task() {
        let err = SchedulerError::TaskTerminal {
            task: "eremetic-task.1".into(),
            status: TaskStatus::Finished,
        };
        assert_eq!(
            err.to_string(),
            "task 'eremetic-task.1' already finished with status TASK_FINISHED"
        );
    }

    #[test]
    fn driver_errors_convert() {
        let err: SchedulerError = DriverError::NotRunning.into();
        assert!(matches!(err, SchedulerError::Driver(DriverError::NotRunning)));
        assert_eq!(err.to_string(), "driver is not running");
    }
}

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure translation from wire-level inputs to internal events.
//!
//! * [`status`]: cluster-manager task-state codes → [`TaskStatus`](crate::task::TaskStatus).
//! * [`message`]: executor framework-message payloads → [`ExecutorMessage`].

pub mod message;
pub mod status;

pub use message::{parse_framework_message, ExecutorMessage, FrameworkMessage};
pub use status::{translate_status, Translation, WireTaskState};

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Executor-originated framework messages.
//!
//! Only the trusted executor identity is parsed at all.  Its payload must be a
//! JSON object with a string `message` field; anything else is reported as
//! malformed and dropped by the caller.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Structured payload sent by the trusted executor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutorMessage {
    pub message: String,

    /// Any further fields the executor attached.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Classification of one framework message.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameworkMessage {
    /// Sent by an executor we do not trust; payload was not inspected.
    Untrusted { executor_id: String },
    Parsed(ExecutorMessage),
    /// Trusted source, unusable payload.
    Malformed { error: String },
}

/// Classify `payload` sent by `executor_id`.
pub fn parse_framework_message(
    executor_id: &str,
    payload: &str,
    trusted_source: &str,
) -> FrameworkMessage {
    if executor_id != trusted_source {
        return FrameworkMessage::Untrusted {
            executor_id: executor_id.to_string(),
        };
    }

    match serde_json::from_str::<ExecutorMessage>(payload) {
        Ok(msg) => FrameworkMessage::Parsed(msg),
        Err(e) => FrameworkMessage::Malformed {
            error: e.to_string(),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

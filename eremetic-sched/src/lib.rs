/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Eremetic – scheduling core for one-off tasks on a resource-offer cluster
//! manager.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task          – task record, status vocabulary, launch descriptor
//! ├── registry      – shared in-memory task registry
//! ├── offer/        – first-fit offer evaluator
//! ├── translate/    – wire status codes and executor messages
//! ├── driver        – outbound driver commands
//! ├── scheduler/    – driver callbacks (the state machine)
//! ├── config/       – YAML scheduler configuration
//! └── scenario      – scripted event replay
//! ```

pub mod config;
pub mod driver;
pub mod offer;
pub mod registry;
pub mod scenario;
pub mod scheduler;
pub mod task;
pub mod translate;

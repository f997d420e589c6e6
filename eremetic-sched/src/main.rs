/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use eremetic_sched::config::SchedulerConfig;
use eremetic_sched::driver::LogDriver;
use eremetic_sched::registry;
use eremetic_sched::scenario::Scenario;
use eremetic_sched::scheduler::EremeticScheduler;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Eremetic scheduler core.
///
/// Example:
///   eremetic-sched -c eremetic.yaml -s scenario.yaml
#[derive(Debug, Parser)]
#[command(
    name = "eremetic-sched",
    about = "Eremetic scheduler core – offer matching and task lifecycle",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML scheduler configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Replay a YAML scenario of task submissions and driver events against a
    /// logging driver.
    #[arg(short = 's', long = "scenario")]
    scenario: Option<PathBuf>,

    /// Override the framework name from the configuration file.
    #[arg(long = "framework-name")]
    framework_name: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Eremetic scheduler starting up...");

    // ── Load configuration ────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => SchedulerConfig::load_from_file(path)?,
        None => {
            warn!("No configuration file provided, using default scheduler settings");
            SchedulerConfig::default()
        }
    };
    if let Some(name) = cli.framework_name {
        config.framework.name = name;
    }

    info!(
        framework      = %config.framework.name,
        user           = %config.framework.user,
        executor_id    = %config.trusted_executor_id,
        task_id_prefix = %config.task_id_prefix,
        refuse_seconds = config.filters.refuse_seconds,
        "Configuration"
    );

    let scheduler = EremeticScheduler::new(config);

    // ── Replay ────────────────────────────────────────────────────────────────
    let Some(path) = cli.scenario else {
        info!("No scenario given; nothing to drive without a cluster-manager driver");
        return Ok(());
    };

    let scenario = load_scenario(&path).await?;
    info!(
        tasks  = scenario.tasks.len(),
        events = scenario.events.len(),
        "Replaying scenario {}",
        path.display()
    );
    scenario.replay(&scheduler, &LogDriver);

    // ── Final registry state ──────────────────────────────────────────────────
    let reg = registry::read(scheduler.registry());
    info!(
        tasks_created = scheduler.tasks_created(),
        counts = ?reg.count_by_status(),
        "Replay complete"
    );
    for summary in reg.snapshot() {
        info!(
            "  [{id}]  status={status}  reason={reason}",
            id = summary.id,
            status = summary.status,
            reason = summary.reason.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

async fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot open scenario file: {}", path.display()))?;
    Scenario::from_yaml_str(&content).with_context(|| format!("Invalid scenario file: {}", path.display()))
}

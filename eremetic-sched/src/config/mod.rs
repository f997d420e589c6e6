//! Scheduler configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! framework:
//!   name: "eremetic"
//!   user: "root"
//! scheduler:
//!   trusted_executor_id: "eremetic-executor"
//!   task_id_prefix: "eremetic-task"
//!   refuse_seconds: 5.0
//! ```
//!
//! Every section and field is optional; absent values fall back to
//! [`SchedulerConfig::default`].

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::driver::{Filters, DEFAULT_REFUSE_SECONDS};

pub const DEFAULT_FRAMEWORK_NAME: &str = "eremetic";
pub const DEFAULT_FRAMEWORK_USER: &str = "root";
pub const DEFAULT_TRUSTED_EXECUTOR_ID: &str = "eremetic-executor";
pub const DEFAULT_TASK_ID_PREFIX: &str = "eremetic-task";

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    framework: FrameworkSection,
    #[serde(default)]
    scheduler: SchedulerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrameworkSection {
    name: Option<String>,
    user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulerSection {
    trusted_executor_id: Option<String>,
    task_id_prefix: Option<String>,
    refuse_seconds: Option<f64>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Framework identity presented to the cluster manager at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkConfig {
    pub name: String,
    pub user: String,
}

/// Runtime configuration for [`EremeticScheduler`](crate::scheduler::EremeticScheduler).
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub framework: FrameworkConfig,

    /// Executor identity whose framework messages are parsed.  Messages from
    /// any other executor id are ignored.
    pub trusted_executor_id: String,

    /// Prefix of generated task ids (`"<prefix>.<uuid>"`).
    pub task_id_prefix: String,

    /// Filters attached to every launch and decline.
    pub filters: Filters,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            framework: FrameworkConfig {
                name: DEFAULT_FRAMEWORK_NAME.to_string(),
                user: DEFAULT_FRAMEWORK_USER.to_string(),
            },
            trusted_executor_id: DEFAULT_TRUSTED_EXECUTOR_ID.to_string(),
            task_id_prefix: DEFAULT_TASK_ID_PREFIX.to_string(),
            filters: Filters {
                refuse_seconds: DEFAULT_REFUSE_SECONDS,
            },
        }
    }
}

impl SchedulerConfig {
    /// Parse `path` into a configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid, or a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading scheduler configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document deserialises to unit, not to an empty mapping.
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML")?
        };

        let defaults = Self::default();
        let config = Self {
            framework: FrameworkConfig {
                name: file.framework.name.unwrap_or(defaults.framework.name),
                user: file.framework.user.unwrap_or(defaults.framework.user),
            },
            trusted_executor_id: file
                .scheduler
                .trusted_executor_id
                .unwrap_or(defaults.trusted_executor_id),
            task_id_prefix: file
                .scheduler
                .task_id_prefix
                .unwrap_or(defaults.task_id_prefix),
            filters: Filters {
                refuse_seconds: file
                    .scheduler
                    .refuse_seconds
                    .unwrap_or(defaults.filters.refuse_seconds),
            },
        };

        config.validate()?;

        debug!(
            framework = %config.framework.name,
            user      = %config.framework.user,
            trusted_executor_id = %config.trusted_executor_id,
            task_id_prefix      = %config.task_id_prefix,
            refuse_seconds      = config.filters.refuse_seconds,
            "scheduler configuration parsed"
        );

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.task_id_prefix.is_empty() {
            bail!("scheduler.task_id_prefix must not be empty");
        }
        if self.trusted_executor_id.is_empty() {
            bail!("scheduler.trusted_executor_id must not be empty");
        }
        let refuse = self.filters.refuse_seconds;
        if !refuse.is_finite() || refuse < 0.0 {
            bail!("scheduler.refuse_seconds must be a non-negative number, got {refuse}");
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_match_executor_identity() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.framework.name, "eremetic");
        assert_eq!(cfg.trusted_executor_id, "eremetic-executor");
        assert_eq!(cfg.task_id_prefix, "eremetic-task");
        assert_eq!(cfg.filters.refuse_seconds, DEFAULT_REFUSE_SECONDS);
    }

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
framework:
  name: "batch"
  user: "nobody"
scheduler:
  trusted_executor_id: "batch-executor"
  task_id_prefix: "batch-task"
  refuse_seconds: 30
"#;
        let f = yaml_tempfile(yaml);
        let cfg = SchedulerConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.framework.name, "batch");
        assert_eq!(cfg.framework.user, "nobody");
        assert_eq!(cfg.trusted_executor_id, "batch-executor");
        assert_eq!(cfg.task_id_prefix, "batch-task");
        assert_eq!(cfg.filters.refuse_seconds, 30.0);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let cfg = SchedulerConfig::from_yaml_str("scheduler:\n  refuse_seconds: 1.5\n").unwrap();
        assert_eq!(cfg.filters.refuse_seconds, 1.5);
        assert_eq!(cfg.framework.name, DEFAULT_FRAMEWORK_NAME);
        assert_eq!(cfg.trusted_executor_id, DEFAULT_TRUSTED_EXECUTOR_ID);
    }

    #[test]
    fn empty_file_is_default_config() {
        let f = yaml_tempfile("");
        let cfg = SchedulerConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg, SchedulerConfig::default());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = SchedulerConfig::load_from_file(Path::new("/nonexistent/path/config.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(SchedulerConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SchedulerConfig::from_yaml_str("scheduler:\n  refuse_secs: 1\n").is_err());
    }

    #[test]
    fn negative_refuse_seconds_is_rejected() {
        let err = SchedulerConfig::from_yaml_str("scheduler:\n  refuse_seconds: -1\n").unwrap_err();
        assert!(format!("{err:#}").contains("refuse_seconds"));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        assert!(SchedulerConfig::from_yaml_str("scheduler:\n  task_id_prefix: \"\"\n").is_err());
    }
}

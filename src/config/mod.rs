//! # HostUpdate Configuration System
//!
//! YAML-based configuration with environment-specific overrides. A single
//! `hostupdate-config.yaml` carries the base values; optional `development`,
//! `test` and `production` sections are deep-merged over them for the active
//! environment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hostupdate_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load_from_directory(None)?;
//!
//! let start_timeout = manager.config().runner.start_timeout();
//! let category = &manager.config().orchestrator.default_category;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::categories::UpdateCategory;
use crate::constants::{orchestrator, runner};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring hostupdate-config.yaml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HostUpdateConfig {
    /// Background task runner settings
    pub runner: RunnerConfig,

    /// Update orchestration settings
    pub orchestrator: OrchestratorConfig,

    /// Log sink settings
    pub logging: LoggingConfig,

    /// Active environment, filled in by the loader
    #[serde(skip_deserializing)]
    pub environment: String,
}

/// Task runner timing and naming
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Stable name the update task is registered under
    pub task_name: String,
    /// Budget for the background task to report itself started
    pub start_timeout_ms: u64,
    /// Sleep between start checks
    pub poll_interval_ms: u64,
    /// Upper bound on the wait for completion after start; absent means unbounded
    pub completion_timeout_ms: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            task_name: runner::DEFAULT_TASK_NAME.to_string(),
            start_timeout_ms: runner::DEFAULT_START_TIMEOUT_MS,
            poll_interval_ms: runner::DEFAULT_POLL_INTERVAL_MS,
            completion_timeout_ms: None,
        }
    }
}

impl RunnerConfig {
    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn completion_timeout(&self) -> Option<Duration> {
        self.completion_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Category used when a request does not name one
    pub default_category: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_category: orchestrator::DEFAULT_CATEGORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive overriding the environment default (e.g. "info")
    pub level: Option<String>,
    pub log_directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            log_directory: "log".to_string(),
        }
    }
}

impl HostUpdateConfig {
    /// Validate configuration values that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.runner.task_name.trim().is_empty() {
            return Err(ConfigurationError::MissingField {
                field: "runner.task_name",
            });
        }

        if self.runner.start_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "runner.start_timeout_ms",
                "0",
                "start timeout must be greater than 0",
            ));
        }

        if self.runner.poll_interval_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "runner.poll_interval_ms",
                "0",
                "poll interval must be greater than 0",
            ));
        }

        if self.runner.poll_interval_ms > self.runner.start_timeout_ms {
            return Err(ConfigurationError::invalid_value(
                "runner.poll_interval_ms",
                self.runner.poll_interval_ms,
                format!(
                    "poll interval must not exceed start timeout ({}ms)",
                    self.runner.start_timeout_ms
                ),
            ));
        }

        if self.runner.completion_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "runner.completion_timeout_ms",
                "0",
                "omit the field for an unbounded wait instead of using 0",
            ));
        }

        if self.logging.log_directory.trim().is_empty() {
            return Err(ConfigurationError::MissingField {
                field: "logging.log_directory",
            });
        }

        if let Err(e) = self
            .orchestrator
            .default_category
            .parse::<UpdateCategory>()
        {
            return Err(ConfigurationError::invalid_value(
                "orchestrator.default_category",
                &self.orchestrator.default_category,
                e.to_string(),
            ));
        }

        Ok(())
    }
}

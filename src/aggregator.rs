//! # Result Aggregation
//!
//! Shapes the task runner's raw channels into the single response object the
//! boundary layer emits. The boundary always gets a response: runner errors,
//! failed runs and empty output all become `failed: true` responses.

use crate::constants::system::UNKNOWN_LOCATION;
use crate::orchestrator::{UpdateItem, UpdateStatus};
use crate::runner::{ErrorRecord, RunnerError, TaskResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Location reported for failures of the runner itself
const RUNNER_LOCATION: &str = "TaskRunner::run";

/// Response handed back across the system boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub changed: bool,
    pub reboot_required: bool,
    pub updates: BTreeMap<String, UpdateItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Trace channel, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_output: Option<Vec<String>>,

    // Side channels for the boundary layer's diagnostics
    #[serde(skip)]
    pub errors: Vec<ErrorRecord>,
    #[serde(skip)]
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub traces: Vec<String>,
}

impl UpdateResponse {
    pub fn is_failed(&self) -> bool {
        self.failed.unwrap_or(false)
    }

    /// A failed response carrying only the error
    pub fn failure(error: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            failed: Some(true),
            error: Some(error.into()),
            location: Some(location.into()),
            ..Self::default()
        }
    }
}

impl From<UpdateStatus> for UpdateResponse {
    fn from(status: UpdateStatus) -> Self {
        let (failed, error, location) = match status.failure {
            Some(info) => (Some(info.failed), Some(info.error), Some(info.location)),
            None => (None, None, None),
        };
        Self {
            changed: status.changed,
            reboot_required: status.reboot_required,
            updates: status.updates,
            failed,
            error,
            location,
            ..Self::default()
        }
    }
}

/// Primary-channel fields, as written by the unit of work and the failure
/// boundary
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PrimaryFields {
    changed: bool,
    reboot_required: bool,
    updates: BTreeMap<String, UpdateItem>,
    failed: Option<bool>,
    error: Option<String>,
    location: Option<String>,
}

/// Folds runner output into an [`UpdateResponse`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    /// Build the response for one run.
    ///
    /// Object values on the primary channel are merged in production order,
    /// later keys overriding earlier ones. Error records are diagnostics only;
    /// failure is signalled by a failed-result record on the primary channel.
    pub fn aggregate(
        result: Result<TaskResult, RunnerError>,
        debug_in_result: bool,
    ) -> UpdateResponse {
        let task = match result {
            Ok(task) => task,
            Err(e) => {
                warn!(error = %e, "Task runner failed - no result collected");
                return UpdateResponse::failure(e.to_string(), RUNNER_LOCATION);
            }
        };

        let mut response = match Self::merge_primary(&task.output) {
            Some(fields) => UpdateResponse {
                changed: fields.changed,
                reboot_required: fields.reboot_required,
                updates: fields.updates,
                failed: fields.failed.filter(|failed| *failed),
                error: fields.error,
                location: fields.location,
                ..UpdateResponse::default()
            },
            None => UpdateResponse::failure(
                "Task completed without producing a result",
                UNKNOWN_LOCATION,
            ),
        };

        if response.is_failed() && response.location.is_none() {
            response.location = Some(UNKNOWN_LOCATION.to_string());
        }
        if debug_in_result {
            response.debug_output = Some(task.traces.clone());
        }

        debug!(
            failed = response.is_failed(),
            updates = response.updates.len(),
            errors = task.errors.len(),
            warnings = task.warnings.len(),
            "Aggregated task result"
        );

        response.errors = task.errors;
        response.warnings = task.warnings;
        response.traces = task.traces;
        response
    }

    fn merge_primary(values: &[Value]) -> Option<PrimaryFields> {
        let mut merged = Map::new();
        for value in values {
            match value {
                Value::Object(fields) => {
                    merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                other => debug!(value = %other, "Ignoring non-object primary output"),
            }
        }

        if merged.is_empty() {
            return None;
        }

        match serde_json::from_value(Value::Object(merged)) {
            Ok(fields) => Some(fields),
            Err(e) => {
                warn!(error = %e, "Primary output does not match the response shape");
                Some(PrimaryFields {
                    failed: Some(true),
                    error: Some(format!("Malformed task result: {e}")),
                    location: Some(UNKNOWN_LOCATION.to_string()),
                    ..PrimaryFields::default()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::failure_record;
    use serde_json::json;

    fn task_with(output: Vec<Value>) -> TaskResult {
        TaskResult {
            output,
            ..TaskResult::default()
        }
    }

    #[test]
    fn test_successful_status() {
        let task = task_with(vec![json!({
            "changed": true,
            "reboot_required": false,
            "updates": {"u1": {"title": "T", "kb": ["KB1"], "id": "u1", "installed": true}}
        })]);

        let response = ResultAggregator::aggregate(Ok(task), false);
        assert!(!response.is_failed());
        assert!(response.changed);
        assert!(response.updates["u1"].installed);
        assert!(response.debug_output.is_none());

        let serialized = serde_json::to_value(&response).unwrap();
        assert!(serialized.get("failed").is_none());
        assert!(serialized.get("errors").is_none());
    }

    #[test]
    fn test_partial_status_plus_failure_record() {
        let task = task_with(vec![
            json!({"changed": false, "reboot_required": true, "updates": {
                "u1": {"title": "T", "kb": [], "id": "u1", "installed": false}
            }}),
            failure_record("A reboot is required", "UpdateOrchestrator::checking_reboot"),
        ]);

        let response = ResultAggregator::aggregate(Ok(task), false);
        assert!(response.is_failed());
        assert!(response.reboot_required);
        assert_eq!(response.updates.len(), 1);
        assert_eq!(response.error.as_deref(), Some("A reboot is required"));
        assert_eq!(
            response.location.as_deref(),
            Some("UpdateOrchestrator::checking_reboot")
        );
    }

    #[test]
    fn test_runner_error_becomes_failed_response() {
        let response = ResultAggregator::aggregate(
            Err(RunnerError::StartTimeout {
                name: "hostupdate".to_string(),
                timeout_ms: 5000,
            }),
            true,
        );
        assert!(response.is_failed());
        assert!(response.error.unwrap().contains("did not start within 5000ms"));
        assert_eq!(response.location.as_deref(), Some(RUNNER_LOCATION));
    }

    #[test]
    fn test_empty_output_is_failure() {
        let response = ResultAggregator::aggregate(Ok(TaskResult::default()), false);
        assert!(response.is_failed());
        assert_eq!(response.location.as_deref(), Some(UNKNOWN_LOCATION));
    }

    #[test]
    fn test_debug_output_and_side_channels() {
        let task = TaskResult {
            output: vec![json!({"changed": false})],
            errors: vec![],
            warnings: vec!["slow mirror".to_string()],
            traces: vec!["phase: searching".to_string()],
        };

        let response = ResultAggregator::aggregate(Ok(task), true);
        assert_eq!(
            response.debug_output,
            Some(vec!["phase: searching".to_string()])
        );
        assert_eq!(response.warnings, vec!["slow mirror"]);
        assert_eq!(response.traces.len(), 1);
    }

    #[test]
    fn test_error_records_alone_do_not_fail() {
        let task = TaskResult {
            output: vec![json!({"changed": false})],
            errors: vec![ErrorRecord {
                message: "transient".to_string(),
                location: "provider".to_string(),
            }],
            ..TaskResult::default()
        };

        let response = ResultAggregator::aggregate(Ok(task), false);
        assert!(!response.is_failed());
        assert_eq!(response.errors.len(), 1);
    }

    #[test]
    fn test_from_status() {
        let mut status = UpdateStatus::default();
        status.changed = true;
        let response = UpdateResponse::from(status);
        assert!(response.changed);
        assert!(!response.is_failed());
    }
}

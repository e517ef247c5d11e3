use super::errors::{RunnerError, RunnerResult};
use super::events::TaskEvent;
use super::launcher::{TaskLauncher, TokioLauncher};
use super::output::TaskResult;
use super::registry::{InMemoryTaskRegistry, TaskRegistry};
use super::states::TaskState;
use super::task::TaskHandle;
use super::unit_of_work::{guarded_job, UnitOfWork};
use crate::config::RunnerConfig;
use crate::constants::events;
use crate::logging::log_task_operation;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Runs units of work as detached background tasks under stable names.
///
/// `run` registers (replacing any task under the same name), launches, polls
/// for start within `start_timeout`, waits for completion (unbounded unless
/// `completion_timeout` is set), snapshots the output log and unregisters.
///
/// # Examples
///
/// ```rust
/// use hostupdate_core::config::RunnerConfig;
/// use hostupdate_core::runner::{from_fn, OutputLog, TaskRunner};
/// use serde_json::{json, Value};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let runner = TaskRunner::new(&RunnerConfig::default());
///     let unit = Arc::new(from_fn(|args: Value, output: OutputLog| async move {
///         output.write_trace("doubling");
///         Ok(json!(args.as_i64().unwrap_or(0) * 2))
///     }));
///
///     let result = runner.run("double", unit, json!(21)).await.unwrap();
///     assert_eq!(result.output, vec![json!(42)]);
/// }
/// ```
#[derive(Clone)]
pub struct TaskRunner {
    registry: Arc<dyn TaskRegistry>,
    launcher: Arc<dyn TaskLauncher>,
    start_timeout: Duration,
    poll_interval: Duration,
    completion_timeout: Option<Duration>,
}

impl TaskRunner {
    /// Runner with an in-process registry and tokio launcher
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            registry: Arc::new(InMemoryTaskRegistry::new()),
            launcher: Arc::new(TokioLauncher),
            start_timeout: config.start_timeout(),
            poll_interval: config.poll_interval(),
            completion_timeout: config.completion_timeout(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn TaskRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn TaskLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn registry(&self) -> &Arc<dyn TaskRegistry> {
        &self.registry
    }

    pub fn start_timeout(&self) -> Duration {
        self.start_timeout
    }

    pub fn completion_timeout(&self) -> Option<Duration> {
        self.completion_timeout
    }

    /// Execute `unit` in the background under `name` and collect its output
    pub async fn run(
        &self,
        name: &str,
        unit: Arc<dyn UnitOfWork>,
        arguments: Value,
    ) -> RunnerResult<TaskResult> {
        let handle = self.register(name).await?;
        let run_id = handle.run_id().to_string();

        let job = guarded_job(Arc::clone(&handle), unit, arguments);
        if let Err(e) = self.launcher.launch(name, job) {
            self.release(&handle).await;
            return Err(e);
        }
        log_task_operation(events::TASK_LAUNCHED, name, Some(&run_id), "launched", None);

        if let Err(e) = self.wait_for_start(&handle).await {
            if e.is_timeout() {
                log_task_operation(
                    events::TASK_START_TIMEOUT,
                    name,
                    Some(&run_id),
                    "unknown",
                    Some("background work may still start; state unknown"),
                );
            }
            self.release(&handle).await;
            return Err(e);
        }

        let finished = self.wait_for_completion(&handle).await;

        // Read the persisted log rather than a one-shot result, so output
        // written before a failure or timeout is never lost
        let result = handle.output().snapshot();
        debug!(
            task_name = %name,
            output = result.output.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            traces = result.traces.len(),
            "Collected task output"
        );

        self.release(&handle).await;

        match finished? {
            TaskState::Replaced => Err(RunnerError::Replaced {
                name: name.to_string(),
            }),
            state => {
                info!(task_name = %name, state = %state, "Task finished");
                Ok(result)
            }
        }
    }

    /// Register a fresh handle, displacing any task under the same name
    async fn register(&self, name: &str) -> RunnerResult<Arc<TaskHandle>> {
        let handle = Arc::new(TaskHandle::new(name));

        if let Some(previous) = self.registry.replace(Arc::clone(&handle)).await? {
            // Finished handles keep their final state
            if previous.state().is_live() {
                if let Err(e) = previous.apply(&TaskEvent::Replace) {
                    debug!(task_name = %name, error = %e, "Previous run finished while replacing");
                }
            }
            log_task_operation(
                events::TASK_REPLACED,
                name,
                Some(&previous.run_id().to_string()),
                &previous.state().to_string(),
                Some("previous run not waited for"),
            );
        }

        log_task_operation(
            events::TASK_REGISTERED,
            name,
            Some(&handle.run_id().to_string()),
            "registered",
            None,
        );
        Ok(handle)
    }

    /// Sleep-then-check until the task reports itself started
    async fn wait_for_start(&self, handle: &TaskHandle) -> RunnerResult<()> {
        let deadline = Instant::now() + self.start_timeout;

        loop {
            let state = handle.state();
            if state.has_started() {
                log_task_operation(
                    events::TASK_STARTED,
                    handle.name(),
                    Some(&handle.run_id().to_string()),
                    &state.to_string(),
                    None,
                );
                return Ok(());
            }
            if state == TaskState::Replaced {
                return Err(RunnerError::Replaced {
                    name: handle.name().to_string(),
                });
            }
            if Instant::now() >= deadline {
                return Err(RunnerError::StartTimeout {
                    name: handle.name().to_string(),
                    timeout_ms: self.start_timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn wait_for_completion(&self, handle: &TaskHandle) -> RunnerResult<TaskState> {
        let receiver = handle.subscribe();

        match self.completion_timeout {
            None => await_finished(receiver).await,
            Some(limit) => tokio::time::timeout(limit, await_finished(receiver))
                .await
                .map_err(|_| RunnerError::CompletionTimeout {
                    name: handle.name().to_string(),
                    timeout_ms: limit.as_millis() as u64,
                })?,
        }
    }

    /// Best-effort unregister; failures are logged, never returned
    async fn release(&self, handle: &TaskHandle) {
        match self
            .registry
            .unregister(handle.name(), handle.run_id())
            .await
        {
            Ok(true) => log_task_operation(
                events::TASK_UNREGISTERED,
                handle.name(),
                Some(&handle.run_id().to_string()),
                &handle.state().to_string(),
                None,
            ),
            Ok(false) => debug!(
                task_name = %handle.name(),
                "Task slot already released or taken over by a newer run"
            ),
            Err(e) => warn!(
                task_name = %handle.name(),
                error = %e,
                "Failed to unregister task - result already captured"
            ),
        }
    }
}

async fn await_finished(
    mut receiver: tokio::sync::watch::Receiver<TaskState>,
) -> RunnerResult<TaskState> {
    let state = receiver
        .wait_for(TaskState::is_finished)
        .await
        .map_err(|e| RunnerError::Internal {
            message: format!("task state channel closed: {e}"),
        })?;
    Ok(*state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::launcher::BackgroundJob;
    use crate::runner::output::OutputLog;
    use crate::runner::unit_of_work::from_fn;
    use serde_json::json;

    fn fast_config() -> RunnerConfig {
        RunnerConfig {
            task_name: "test".to_string(),
            start_timeout_ms: 200,
            poll_interval_ms: 10,
            completion_timeout_ms: None,
        }
    }

    /// Accepts jobs and never polls them
    struct StalledLauncher {
        parked: parking_lot::Mutex<Vec<BackgroundJob>>,
    }

    impl TaskLauncher for StalledLauncher {
        fn launch(&self, _task_name: &str, job: BackgroundJob) -> RunnerResult<()> {
            self.parked.lock().push(job);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_collects_all_channels() {
        let runner = TaskRunner::new(&fast_config());
        let unit = Arc::new(from_fn(|_: Value, output: OutputLog| async move {
            output.write_warning("low disk space");
            output.write_trace("step one");
            Ok(json!({"changed": false}))
        }));

        let result = runner.run("collect", unit, Value::Null).await.unwrap();
        assert_eq!(result.output, vec![json!({"changed": false})]);
        assert_eq!(result.warnings, vec!["low disk space"]);
        assert_eq!(result.traces, vec!["step one"]);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_run_unregisters_after_collection() {
        let runner = TaskRunner::new(&fast_config());
        let unit = Arc::new(from_fn(|_: Value, _: OutputLog| async move { Ok(json!(1)) }));

        runner.run("cleanup", unit, Value::Null).await.unwrap();
        assert!(runner.registry().get("cleanup").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_timeout_when_task_never_starts() {
        let launcher = Arc::new(StalledLauncher {
            parked: parking_lot::Mutex::new(Vec::new()),
        });
        let runner = TaskRunner::new(&fast_config()).with_launcher(launcher.clone());
        let unit = Arc::new(from_fn(|_: Value, _: OutputLog| async move { Ok(json!(1)) }));

        let err = runner.run("stalled", unit, Value::Null).await.unwrap_err();
        assert!(matches!(
            err,
            RunnerError::StartTimeout { ref name, timeout_ms: 200 } if name == "stalled"
        ));
        assert!(err.is_timeout());
        assert_eq!(launcher.parked.lock().len(), 1);
        assert!(runner.registry().get("stalled").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_timeout_is_configurable() {
        let mut config = fast_config();
        config.completion_timeout_ms = Some(1_000);
        let runner = TaskRunner::new(&config);
        let unit = Arc::new(from_fn(|_: Value, output: OutputLog| async move {
            output.write_trace("installing");
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(json!(1))
        }));

        let err = runner.run("slow", unit, Value::Null).await.unwrap_err();
        assert!(matches!(
            err,
            RunnerError::CompletionTimeout { timeout_ms: 1_000, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_wait_outlasts_start_budget() {
        let runner = TaskRunner::new(&fast_config());
        let unit = Arc::new(from_fn(|_: Value, _: OutputLog| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(json!("done"))
        }));

        let result = runner.run("long", unit, Value::Null).await.unwrap();
        assert_eq!(result.output, vec![json!("done")]);
    }

    #[tokio::test]
    async fn test_unit_failure_is_data_not_error() {
        let runner = TaskRunner::new(&fast_config());
        let unit = Arc::new(from_fn(|_: Value, _: OutputLog| async move {
            Err::<Value, _>(anyhow::anyhow!("install failed"))
        }));

        let result = runner.run("failing", unit, Value::Null).await.unwrap();
        assert!(result.has_failure());
        assert_eq!(result.output[0]["error"], json!("install failed"));
        assert_eq!(result.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_arguments_reach_unit_of_work() {
        let runner = TaskRunner::new(&fast_config());
        let unit = Arc::new(from_fn(|args: Value, _: OutputLog| async move {
            Ok(json!({"category": args["category"].clone()}))
        }));

        let result = runner
            .run("args", unit, json!({"category": "Tools"}))
            .await
            .unwrap();
        assert_eq!(result.output[0]["category"], json!("Tools"));
    }
}

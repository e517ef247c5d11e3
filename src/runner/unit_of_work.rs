//! # Unit of Work
//!
//! The fallible computation a [`TaskRunner`](super::TaskRunner) executes in the
//! background, plus the boundary that turns its failures into data.
//!
//! Nothing raised inside the background task crosses back to the poller as a
//! Rust error. Returned errors and panics alike are written to the task's
//! output log as `{failed: true, error, location}` before the task reports
//! itself finished.

use super::events::TaskEvent;
use super::launcher::BackgroundJob;
use super::output::OutputLog;
use super::states::TaskState;
use super::task::TaskHandle;
use crate::constants::events;
use crate::constants::system::{ABANDONED_LOCATION, ABANDONED_MESSAGE, UNKNOWN_LOCATION};
use crate::logging::{log_error, log_task_operation};
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::backtrace::BacktraceStatus;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// Work executed by the task runner
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Run with the given arguments. The returned value lands on the primary
    /// output channel; anything else worth keeping goes through `output`.
    async fn execute(&self, arguments: Value, output: OutputLog) -> anyhow::Result<Value>;
}

/// Adapter running a closure as a unit of work
pub struct FnUnitOfWork<F> {
    f: F,
}

/// Wrap a closure `(arguments, output) -> future` as a unit of work
pub fn from_fn<F, Fut>(f: F) -> FnUnitOfWork<F>
where
    F: Fn(Value, OutputLog) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    FnUnitOfWork { f }
}

#[async_trait]
impl<F, Fut> UnitOfWork for FnUnitOfWork<F>
where
    F: Fn(Value, OutputLog) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    async fn execute(&self, arguments: Value, output: OutputLog) -> anyhow::Result<Value> {
        (self.f)(arguments, output).await
    }
}

/// Wrap a unit of work into a detached job that drives the handle's lifecycle
/// and records every outcome, including panics, in the handle's output log
pub(crate) fn guarded_job(
    handle: Arc<TaskHandle>,
    unit: Arc<dyn UnitOfWork>,
    arguments: Value,
) -> BackgroundJob {
    Box::pin(async move {
        let task_name = handle.name().to_string();
        let run_id = handle.run_id().to_string();

        if let Err(e) = handle.apply(&TaskEvent::Start) {
            // Replaced before the launcher got to it
            warn!(task_name = %task_name, error = %e, "Task not started");
            return;
        }
        log_task_operation(events::TASK_STARTED, &task_name, Some(&run_id), "running", None);
        let _abandoned = AbandonGuard {
            handle: Arc::clone(&handle),
        };

        let output = handle.output().clone();
        let outcome = AssertUnwindSafe(unit.execute(arguments, output.clone()))
            .catch_unwind()
            .await;

        let event = match outcome {
            Ok(Ok(value)) => {
                if !value.is_null() {
                    output.write_output(value);
                }
                TaskEvent::Complete
            }
            Ok(Err(err)) => {
                let message = err.to_string();
                let location = error_location(&err);
                output.write_failure(&message, &location);
                log_error("unit_of_work", &task_name, &message, Some(&location));
                TaskEvent::Fail(message)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                let location = format!("panic in unit of work '{task_name}'");
                output.write_failure(&message, &location);
                log_error("unit_of_work", &task_name, &message, Some(&location));
                TaskEvent::Fail(message)
            }
        };

        let operation = match event {
            TaskEvent::Complete => events::TASK_COMPLETED,
            _ => events::TASK_FAILED,
        };
        match handle.apply(&event) {
            Ok(state) => log_task_operation(
                operation,
                &task_name,
                Some(&run_id),
                &state.to_string(),
                event.error_message(),
            ),
            Err(e) => debug!(
                task_name = %task_name,
                error = %e,
                "Finished task no longer owns its slot; output kept on its own log"
            ),
        }
    })
}

/// Fails a started handle whose job is dropped before it records an outcome,
/// e.g. an aborted task or a runtime shutting down mid-run
struct AbandonGuard {
    handle: Arc<TaskHandle>,
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if self.handle.state() != TaskState::Running {
            return;
        }

        let name = self.handle.name();
        self.handle
            .output()
            .write_failure(ABANDONED_MESSAGE, ABANDONED_LOCATION);
        log_error("unit_of_work", name, ABANDONED_MESSAGE, Some(ABANDONED_LOCATION));
        if let Err(e) = self
            .handle
            .apply(&TaskEvent::Fail(ABANDONED_MESSAGE.to_string()))
        {
            debug!(task_name = %name, error = %e, "Abandoned task already finished");
        }
    }
}

/// Trace string for an error: its cause chain, or a backtrace when captured
fn error_location(err: &anyhow::Error) -> String {
    let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();

    if !causes.is_empty() {
        causes.join(" <- ")
    } else if err.backtrace().status() == BacktraceStatus::Captured {
        err.backtrace().to_string()
    } else {
        UNKNOWN_LOCATION.to_string()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unit of work panicked".to_string()
    }
}

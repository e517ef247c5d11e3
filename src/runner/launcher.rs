use super::errors::{RunnerError, RunnerResult};
use futures::future::BoxFuture;
use tracing::debug;

/// Fully wrapped background work, ready to be detached
pub type BackgroundJob = BoxFuture<'static, ()>;

/// Detaches background jobs from the caller. The caller never joins the job;
/// it only observes the task's state and output log.
pub trait TaskLauncher: Send + Sync {
    fn launch(&self, task_name: &str, job: BackgroundJob) -> RunnerResult<()>;
}

/// Launches jobs on the current tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl TaskLauncher for TokioLauncher {
    fn launch(&self, task_name: &str, job: BackgroundJob) -> RunnerResult<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| RunnerError::Launch {
            name: task_name.to_string(),
            message: e.to_string(),
        })?;

        // Dropping the join handle detaches the task
        let _detached = runtime.spawn(job);
        debug!(task_name = %task_name, "Launched background task");
        Ok(())
    }
}

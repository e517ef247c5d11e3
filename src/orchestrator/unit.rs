use super::types::UpdateRequest;
use super::update_orchestrator::UpdateOrchestrator;
use crate::constants::orchestrator::DEFAULT_CATEGORY;
use crate::provider::UpdateSourceProvider;
use crate::runner::{OutputLog, UnitOfWork};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Runs the update orchestrator as a task runner unit of work.
///
/// Arguments are an [`UpdateRequest`] as JSON; a request without a category
/// runs against `CriticalUpdates`. A successful run returns the
/// status. A failed run writes the partial status to the primary channel and
/// returns an error whose message is the failure and whose cause is the failing
/// step, so the recorded `location` names that step.
pub struct UpdateUnitOfWork {
    provider: Arc<dyn UpdateSourceProvider>,
}

impl UpdateUnitOfWork {
    pub fn new(provider: Arc<dyn UpdateSourceProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl UnitOfWork for UpdateUnitOfWork {
    async fn execute(&self, arguments: Value, output: OutputLog) -> anyhow::Result<Value> {
        let request: UpdateRequest =
            serde_json::from_value(arguments).context("Invalid update request arguments")?;

        let category = request.category.as_deref().unwrap_or(DEFAULT_CATEGORY);

        let orchestrator = UpdateOrchestrator::new(Arc::clone(&self.provider))
            .with_trace(output.clone())
            .with_trace_mirroring(request.debug_in_stderr);

        match orchestrator.execute(category, request.check_mode).await
        {
            Ok(status) => Ok(serde_json::to_value(status)?),
            Err(failure) => {
                output.write_output(serde_json::to_value(&failure.status)?);
                Err(anyhow::Error::msg(failure.location()).context(failure.error))
            }
        }
    }
}

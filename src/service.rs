//! # Host Update Service
//!
//! Entry point for the boundary layer: one call per request, always answered
//! with an [`UpdateResponse`].

use crate::aggregator::{ResultAggregator, UpdateResponse};
use crate::config::HostUpdateConfig;
use crate::orchestrator::{UpdateRequest, UpdateUnitOfWork};
use crate::provider::UpdateSourceProvider;
use crate::runner::TaskRunner;
use std::sync::Arc;
use tracing::{error, info};

pub struct HostUpdateService {
    runner: TaskRunner,
    unit: Arc<UpdateUnitOfWork>,
    task_name: String,
    default_category: String,
}

impl HostUpdateService {
    pub fn new(config: &HostUpdateConfig, provider: Arc<dyn UpdateSourceProvider>) -> Self {
        Self {
            runner: TaskRunner::new(&config.runner),
            unit: Arc::new(UpdateUnitOfWork::new(provider)),
            task_name: config.runner.task_name.clone(),
            default_category: config.orchestrator.default_category.clone(),
        }
    }

    /// Use a preconfigured runner, e.g. one backed by an external registry
    pub fn with_runner(mut self, runner: TaskRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    /// Category used for requests that name none
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Run one update request in the background and shape its result
    pub async fn run(&self, request: UpdateRequest) -> UpdateResponse {
        let request = request.or_category(&self.default_category);
        info!(
            task_name = %self.task_name,
            category = request.category.as_deref().unwrap_or_default(),
            check_mode = request.check_mode,
            "Running host update request"
        );

        let arguments = match serde_json::to_value(&request) {
            Ok(arguments) => arguments,
            Err(e) => {
                error!(error = %e, "Failed to encode update request");
                return UpdateResponse::failure(
                    format!("Failed to encode update request: {e}"),
                    "HostUpdateService::run",
                );
            }
        };

        let result = self
            .runner
            .run(&self.task_name, self.unit.clone(), arguments)
            .await;
        ResultAggregator::aggregate(result, request.debug_in_result)
    }
}

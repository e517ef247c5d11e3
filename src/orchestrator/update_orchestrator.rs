//! # Update Orchestrator
//!
//! Drives one search → EULA → reboot gate → download → install → reboot
//! recheck run against an [`UpdateSourceProvider`]. Every step runs to
//! completion before the next begins and nothing is retried; the first fatal
//! error ends the run with the status gathered so far.

use super::errors::{failure_location, OrchestrationFailure, UpdateError};
use super::states::OrchestrationPhase;
use super::types::{FailureInfo, UpdateBatch, UpdateStatus};
use crate::categories::UpdateCategory;
use crate::constants::events;
use crate::logging::log_update_operation;
use crate::provider::{SearchCriteria, UpdateSourceProvider};
use crate::runner::OutputLog;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct UpdateOrchestrator {
    provider: Arc<dyn UpdateSourceProvider>,
    trace: Option<OutputLog>,
    mirror_trace: bool,
}

/// Mutable state of a single run
struct Run {
    phase: OrchestrationPhase,
    status: UpdateStatus,
}

impl UpdateOrchestrator {
    pub fn new(provider: Arc<dyn UpdateSourceProvider>) -> Self {
        Self {
            provider,
            trace: None,
            mirror_trace: false,
        }
    }

    /// Mirror phase transitions and per-item progress into a task's trace channel
    pub fn with_trace(mut self, output: OutputLog) -> Self {
        self.trace = Some(output);
        self
    }

    /// Also emit every trace line as a `warn` event on the `hostupdate::debug`
    /// target
    pub fn with_trace_mirroring(mut self, mirror: bool) -> Self {
        self.mirror_trace = mirror;
        self
    }

    /// Run the update sequence for `category` and report the outcome
    pub async fn execute(
        &self,
        category: &str,
        dry_run: bool,
    ) -> Result<UpdateStatus, OrchestrationFailure> {
        info!(
            provider = %self.provider.provider_name(),
            category = %category,
            dry_run = dry_run,
            "Starting update orchestration"
        );

        let mut run = Run {
            phase: OrchestrationPhase::Resolving,
            status: UpdateStatus::default(),
        };

        match self.drive(&mut run, category, dry_run).await {
            Ok(()) => {
                self.enter(&mut run, OrchestrationPhase::Complete);
                info!(
                    changed = run.status.changed,
                    reboot_required = run.status.reboot_required,
                    updates = run.status.updates.len(),
                    installed = run.status.installed_count(),
                    "Update orchestration complete"
                );
                Ok(run.status)
            }
            Err(error) => {
                let phase = run.phase;
                let location = failure_location(phase);
                warn!(phase = %phase, error = %error, "Update orchestration failed");
                self.trace(format!("failed during {phase}: {error}"));
                self.enter(&mut run, OrchestrationPhase::Failed);

                run.status.failure = Some(FailureInfo::new(error.to_string(), location));
                Err(OrchestrationFailure {
                    error,
                    phase,
                    status: run.status,
                })
            }
        }
    }

    async fn drive(&self, run: &mut Run, category: &str, dry_run: bool) -> Result<(), UpdateError> {
        let category: UpdateCategory = category.parse()?;
        let category_id = category.provider_id();
        self.trace(format!("category {category} resolved to {category_id}"));

        self.enter(run, OrchestrationPhase::Searching);
        let criteria = SearchCriteria::pending().with_category(category_id);
        let results = self.provider.search(&criteria).await?;
        let found = results.len();
        let mut batch = UpdateBatch::from_search(results, category_id);
        run.status.record_batch(&batch);
        log_update_operation(
            events::UPDATE_SEARCH_COMPLETED,
            None,
            None,
            "completed",
            Some(&format!("{} of {found} pending updates in {category}", batch.len())),
        );
        self.trace(format!("found {} pending updates", batch.len()));

        self.enter(run, OrchestrationPhase::AcceptingEulas);
        for update in batch.iter_mut().filter(|update| !update.eula_accepted) {
            self.provider.accept_eula(&update.id).await?;
            update.eula_accepted = true;
            run.status.mark_eula_accepted(&update.id);
            log_update_operation(
                events::UPDATE_EULA_ACCEPTED,
                Some(&update.id),
                Some(&update.title),
                "accepted",
                None,
            );
        }

        self.enter(run, OrchestrationPhase::CheckingReboot);
        run.status.reboot_required = self.provider.reboot_required().await?;
        log_update_operation(
            events::UPDATE_REBOOT_CHECKED,
            None,
            None,
            if run.status.reboot_required { "pending" } else { "clear" },
            Some("before install"),
        );

        if dry_run {
            run.status.changed = !batch.is_empty();
            self.trace(format!(
                "check mode: {} updates would be installed",
                batch.len()
            ));
            return Ok(());
        }

        if batch.is_empty() {
            debug!("No pending updates - nothing to download or install");
        } else if run.status.reboot_required {
            return Err(UpdateError::RebootRequired);
        }

        self.enter(run, OrchestrationPhase::Downloading);
        for update in batch.iter() {
            if update.is_downloaded {
                log_update_operation(
                    events::UPDATE_DOWNLOAD_SKIPPED,
                    Some(&update.id),
                    Some(&update.title),
                    "already_downloaded",
                    None,
                );
                continue;
            }

            self.trace(format!("downloading {}", update.title));
            let outcome = self.provider.download(update).await?;
            if !outcome.is_success() {
                return Err(UpdateError::DownloadFailed {
                    update_id: update.id.clone(),
                    title: update.title.clone(),
                    result_code: outcome.result_code,
                    hresult: outcome.hresult,
                });
            }
            log_update_operation(
                events::UPDATE_DOWNLOADED,
                Some(&update.id),
                Some(&update.title),
                &outcome.result_code.to_string(),
                None,
            );
        }

        self.enter(run, OrchestrationPhase::Installing);
        for update in batch.iter() {
            self.trace(format!("installing {}", update.title));
            let outcome = self.provider.install(update).await?;
            if !outcome.is_success() {
                return Err(UpdateError::InstallFailed {
                    update_id: update.id.clone(),
                    title: update.title.clone(),
                    result_code: outcome.result_code,
                    hresult: outcome.hresult,
                });
            }
            run.status.mark_installed(&update.id);
            log_update_operation(
                events::UPDATE_INSTALLED,
                Some(&update.id),
                Some(&update.title),
                &outcome.result_code.to_string(),
                None,
            );
        }

        self.enter(run, OrchestrationPhase::RecheckingReboot);
        run.status.reboot_required = self.provider.reboot_required().await?;
        log_update_operation(
            events::UPDATE_REBOOT_CHECKED,
            None,
            None,
            if run.status.reboot_required { "pending" } else { "clear" },
            Some("after install"),
        );

        Ok(())
    }

    fn enter(&self, run: &mut Run, phase: OrchestrationPhase) {
        debug!(from = %run.phase, to = %phase, "Update orchestration phase transition");
        run.phase = phase;
        self.trace(format!("phase: {phase}"));
    }

    fn trace(&self, message: String) {
        if self.mirror_trace {
            warn!(target: "hostupdate::debug", "{message}");
        }
        if let Some(output) = &self.trace {
            output.write_trace(message);
        }
    }
}

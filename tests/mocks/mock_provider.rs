//! Mock Update Source Provider for Testing
//!
//! Provides an in-memory implementation of the UpdateSourceProvider trait that
//! records every call, so tests can assert exactly what the orchestrator asked
//! the host to do.

use async_trait::async_trait;
use hostupdate_core::categories::UpdateCategory;
use hostupdate_core::provider::{
    OperationOutcome, ProviderError, ProviderUpdate, SearchCriteria, UpdateSourceProvider,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock provider state for tracking calls and simulating host behavior
#[derive(Debug, Default, Clone)]
pub struct MockProviderState {
    /// Updates the host still reports as pending
    pub pending: Vec<ProviderUpdate>,
    /// Whether the host has a reboot pending
    pub reboot_pending: bool,
    /// Reboot state the host reports once anything was installed
    pub reboot_after_install: Option<bool>,
    /// Outcomes for specific update ids; success otherwise
    pub download_outcomes: HashMap<String, OperationOutcome>,
    pub install_outcomes: HashMap<String, OperationOutcome>,
    /// Simulated search failure
    pub search_error: Option<ProviderError>,

    /// Track search criteria
    pub searches: Vec<SearchCriteria>,
    /// Track EULA acceptances
    pub accepted_eulas: Vec<String>,
    /// Track download requests, one id per request
    pub downloads: Vec<String>,
    /// Track install requests, one id per request
    pub installs: Vec<String>,
    /// Track reboot-pending queries
    pub reboot_checks: usize,
}

/// Mock provider implementation for testing
#[derive(Clone)]
pub struct MockProvider {
    state: Arc<Mutex<MockProviderState>>,
    /// Simulate slow search
    search_delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockProviderState::default())),
            search_delay: None,
        }
    }

    pub fn with_update(self, update: ProviderUpdate) -> Self {
        self.state.lock().unwrap().pending.push(update);
        self
    }

    pub fn with_reboot_pending(self, pending: bool) -> Self {
        self.state.lock().unwrap().reboot_pending = pending;
        self
    }

    pub fn with_reboot_after_install(self, pending: bool) -> Self {
        self.state.lock().unwrap().reboot_after_install = Some(pending);
        self
    }

    pub fn with_download_outcome(self, update_id: &str, outcome: OperationOutcome) -> Self {
        self.state
            .lock()
            .unwrap()
            .download_outcomes
            .insert(update_id.to_string(), outcome);
        self
    }

    pub fn with_install_outcome(self, update_id: &str, outcome: OperationOutcome) -> Self {
        self.state
            .lock()
            .unwrap()
            .install_outcomes
            .insert(update_id.to_string(), outcome);
        self
    }

    pub fn with_search_error(self, error: ProviderError) -> Self {
        self.state.lock().unwrap().search_error = Some(error);
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = Some(delay);
        self
    }

    /// Snapshot of everything recorded so far
    pub fn state(&self) -> MockProviderState {
        self.state.lock().unwrap().clone()
    }

    pub fn shared(&self) -> Arc<dyn UpdateSourceProvider> {
        Arc::new(self.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpdateSourceProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ProviderUpdate>, ProviderError> {
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.searches.push(criteria.clone());
        if let Some(error) = state.search_error.clone() {
            return Err(error);
        }
        Ok(state.pending.clone())
    }

    async fn accept_eula(&self, update_id: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.accepted_eulas.push(update_id.to_string());
        if let Some(update) = state.pending.iter_mut().find(|u| u.id == update_id) {
            update.eula_accepted = true;
        }
        Ok(())
    }

    async fn download(&self, update: &ProviderUpdate) -> Result<OperationOutcome, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.downloads.push(update.id.clone());
        let outcome = state
            .download_outcomes
            .get(&update.id)
            .cloned()
            .unwrap_or_else(OperationOutcome::succeeded);
        if outcome.is_success() {
            if let Some(pending) = state.pending.iter_mut().find(|u| u.id == update.id) {
                pending.is_downloaded = true;
            }
        }
        Ok(outcome)
    }

    async fn install(&self, update: &ProviderUpdate) -> Result<OperationOutcome, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.installs.push(update.id.clone());
        let outcome = state
            .install_outcomes
            .get(&update.id)
            .cloned()
            .unwrap_or_else(OperationOutcome::succeeded);
        if outcome.is_success() {
            state.pending.retain(|u| u.id != update.id);
            if let Some(reboot) = state.reboot_after_install {
                state.reboot_pending = reboot;
            }
        }
        Ok(outcome)
    }

    async fn reboot_required(&self) -> Result<bool, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.reboot_checks += 1;
        Ok(state.reboot_pending)
    }
}

/// A pending update in the given category
pub fn pending_update(id: &str, category: UpdateCategory) -> ProviderUpdate {
    ProviderUpdate {
        id: id.to_string(),
        title: format!("Update {id}"),
        kb_article_ids: vec![format!("KB{}", 5000000 + id.len())],
        category_ids: vec![category.provider_id().to_string()],
        eula_accepted: false,
        is_downloaded: false,
    }
}

/// A pending critical update
pub fn critical_update(id: &str) -> ProviderUpdate {
    pending_update(id, UpdateCategory::CriticalUpdates)
}

/// A pending update from a provider that filters server-side and reports no
/// category ids
pub fn untagged_update(id: &str) -> ProviderUpdate {
    ProviderUpdate {
        category_ids: Vec::new(),
        ..critical_update(id)
    }
}

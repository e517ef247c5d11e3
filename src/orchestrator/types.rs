//! # Update Orchestration Types
//!
//! The per-run data model: the request, the frozen batch of discovered updates,
//! and the status report handed back to the caller.

use crate::provider::ProviderUpdate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Parameters of one update run, as received from the boundary layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    /// Category name; the service's configured default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Report intended changes without downloading or installing
    pub check_mode: bool,
    /// Return the trace channel in the response
    pub debug_in_result: bool,
    /// Mirror the trace channel to the process log as it is written
    pub debug_in_stderr: bool,
}

impl UpdateRequest {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Fill in `category` when the caller left it out
    pub fn or_category(mut self, category: &str) -> Self {
        if self.category.is_none() {
            self.category = Some(category.to_string());
        }
        self
    }

    pub fn check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn debug_in_result(mut self, debug_in_result: bool) -> Self {
        self.debug_in_result = debug_in_result;
        self
    }

    pub fn debug_in_stderr(mut self, debug_in_stderr: bool) -> Self {
        self.debug_in_stderr = debug_in_stderr;
        self
    }
}

/// Per-update entry of the status report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub title: String,
    pub kb: Vec<String>,
    pub id: String,
    pub installed: bool,
    #[serde(skip)]
    pub eula_accepted: bool,
}

impl From<&ProviderUpdate> for UpdateItem {
    fn from(update: &ProviderUpdate) -> Self {
        Self {
            title: update.title.clone(),
            kb: update.kb_article_ids.clone(),
            id: update.id.clone(),
            installed: false,
            eula_accepted: update.eula_accepted,
        }
    }
}

/// Updates discovered by one search, in discovery order, unique by id.
/// Built once per run and never re-queried.
#[derive(Debug, Clone, Default)]
pub struct UpdateBatch {
    updates: Vec<ProviderUpdate>,
}

impl UpdateBatch {
    /// Keep the search results that belong to `category_id`, dropping repeats.
    /// Results without category ids are trusted to match the search criteria.
    pub fn from_search(results: Vec<ProviderUpdate>, category_id: &str) -> Self {
        let mut seen = HashSet::new();
        let updates = results
            .into_iter()
            .filter(|update| {
                update.category_ids.is_empty()
                    || update
                        .category_ids
                        .iter()
                        .any(|id| id.eq_ignore_ascii_case(category_id))
            })
            .filter(|update| seen.insert(update.id.clone()))
            .collect();
        Self { updates }
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderUpdate> {
        self.updates.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ProviderUpdate> {
        self.updates.iter_mut()
    }
}

/// Failure summary carried on the status report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureInfo {
    pub failed: bool,
    pub error: String,
    pub location: String,
}

impl FailureInfo {
    pub fn new(error: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            failed: true,
            error: error.into(),
            location: location.into(),
        }
    }
}

/// Outcome of one orchestration run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub changed: bool,
    pub reboot_required: bool,
    pub updates: BTreeMap<String, UpdateItem>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureInfo>,
}

impl UpdateStatus {
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn installed_count(&self) -> usize {
        self.updates.values().filter(|item| item.installed).count()
    }

    pub(crate) fn record_batch(&mut self, batch: &UpdateBatch) {
        for update in batch.iter() {
            self.updates
                .entry(update.id.clone())
                .or_insert_with(|| UpdateItem::from(update));
        }
    }

    pub(crate) fn mark_eula_accepted(&mut self, update_id: &str) {
        if let Some(item) = self.updates.get_mut(update_id) {
            item.eula_accepted = true;
        }
    }

    pub(crate) fn mark_installed(&mut self, update_id: &str) {
        if let Some(item) = self.updates.get_mut(update_id) {
            item.installed = true;
            self.changed = true;
        }
    }
}

//! # Named Task Registry
//!
//! Process-owned key-value registry of live task handles, one slot per name.
//!
//! ## Replace semantics
//!
//! Registering under an occupied name removes the old handle first (a missing
//! handle is fine) and then inserts the new one. The old run is not waited for.
//! Two callers sharing a name concurrently race; callers must use distinct names
//! or serialize externally.

use super::errors::RegistryError;
use super::task::TaskHandle;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Storage for named task slots. Implementations may front an external job
/// service; every operation can therefore fail.
#[async_trait]
pub trait TaskRegistry: Send + Sync {
    /// Look up the live handle for a name
    async fn get(&self, name: &str) -> Result<Option<Arc<TaskHandle>>, RegistryError>;

    /// Insert into an empty slot; an occupied slot is an error
    async fn insert(&self, handle: Arc<TaskHandle>) -> Result<(), RegistryError>;

    /// Remove whatever occupies the slot, returning it if there was one
    async fn remove(&self, name: &str) -> Result<Option<Arc<TaskHandle>>, RegistryError>;

    /// Remove the slot only if it still holds the given run. Returns whether a
    /// handle was removed.
    async fn unregister(&self, name: &str, run_id: Uuid) -> Result<bool, RegistryError>;

    /// Names currently registered
    async fn names(&self) -> Result<Vec<String>, RegistryError>;

    /// Deregister any existing handle under the same name, then register this
    /// one. Returns the handle that was displaced.
    async fn replace(
        &self,
        handle: Arc<TaskHandle>,
    ) -> Result<Option<Arc<TaskHandle>>, RegistryError> {
        let previous = self.remove(handle.name()).await?;
        self.insert(handle).await?;
        Ok(previous)
    }
}

/// In-process registry backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryTaskRegistry {
    slots: DashMap<String, Arc<TaskHandle>>,
}

impl InMemoryTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[async_trait]
impl TaskRegistry for InMemoryTaskRegistry {
    async fn get(&self, name: &str) -> Result<Option<Arc<TaskHandle>>, RegistryError> {
        Ok(self.slots.get(name).map(|entry| Arc::clone(entry.value())))
    }

    async fn insert(&self, handle: Arc<TaskHandle>) -> Result<(), RegistryError> {
        match self.slots.entry(handle.name().to_string()) {
            Entry::Occupied(_) => Err(RegistryError::SlotOccupied {
                name: handle.name().to_string(),
            }),
            Entry::Vacant(slot) => {
                info!(
                    task_name = %handle.name(),
                    run_id = %handle.run_id(),
                    "Registered task"
                );
                slot.insert(handle);
                Ok(())
            }
        }
    }

    async fn remove(&self, name: &str) -> Result<Option<Arc<TaskHandle>>, RegistryError> {
        let removed = self.slots.remove(name).map(|(_, handle)| handle);
        if removed.is_none() {
            debug!(task_name = %name, "No task registered under name - nothing to remove");
        }
        Ok(removed)
    }

    async fn unregister(&self, name: &str, run_id: Uuid) -> Result<bool, RegistryError> {
        Ok(self
            .slots
            .remove_if(name, |_, handle| handle.run_id() == run_id)
            .is_some())
    }

    async fn names(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self.slots.iter().map(|entry| entry.key().clone()).collect())
    }
}

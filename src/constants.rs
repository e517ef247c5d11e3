//! # System Constants
//!
//! Operational defaults and lifecycle event names shared by the task runner and
//! the update orchestrator.

// Re-export state types for convenience
pub use crate::orchestrator::states::OrchestrationPhase;
pub use crate::runner::states::TaskState;

/// Lifecycle events emitted through structured logging
pub mod events {
    // Task runner lifecycle events
    pub const TASK_REGISTERED: &str = "task.registered";
    pub const TASK_REPLACED: &str = "task.replaced";
    pub const TASK_LAUNCHED: &str = "task.launched";
    pub const TASK_STARTED: &str = "task.started";
    pub const TASK_COMPLETED: &str = "task.completed";
    pub const TASK_FAILED: &str = "task.failed";
    pub const TASK_START_TIMEOUT: &str = "task.start_timeout";
    pub const TASK_UNREGISTERED: &str = "task.unregistered";

    // Update orchestration events
    pub const UPDATE_SEARCH_COMPLETED: &str = "update.search_completed";
    pub const UPDATE_EULA_ACCEPTED: &str = "update.eula_accepted";
    pub const UPDATE_DOWNLOADED: &str = "update.downloaded";
    pub const UPDATE_DOWNLOAD_SKIPPED: &str = "update.download_skipped";
    pub const UPDATE_INSTALLED: &str = "update.installed";
    pub const UPDATE_REBOOT_CHECKED: &str = "update.reboot_checked";
}

/// Task runner timing defaults
pub mod runner {
    /// Name under which the update task is registered when none is configured
    pub const DEFAULT_TASK_NAME: &str = "hostupdate";

    /// Budget for the background task to report itself started
    pub const DEFAULT_START_TIMEOUT_MS: u64 = 5000;

    /// Sleep between start checks
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
}

/// Update orchestration defaults and messages
pub mod orchestrator {
    pub const DEFAULT_CATEGORY: &str = "CriticalUpdates";

    pub const REBOOT_REQUIRED_MESSAGE: &str =
        "A reboot is required before more updates can be installed";
}

/// System-wide identification
pub mod system {
    pub const HOSTUPDATE_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Location reported when a failure carries no richer trace
    pub const UNKNOWN_LOCATION: &str = "unknown";

    /// Location reported for a started job dropped before it recorded an outcome
    pub const ABANDONED_LOCATION: &str = "TaskRunner::background";

    pub const ABANDONED_MESSAGE: &str = "background task ended before recording a result";
}

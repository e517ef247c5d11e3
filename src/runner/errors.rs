use thiserror::Error;

/// Failures of the named task registry
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("Task slot '{name}' is already occupied")]
    SlotOccupied { name: String },

    #[error("Could not remove task '{name}' from its slot: {message}")]
    RemovalFailed { name: String, message: String },

    #[error("Task registry unavailable: {message}")]
    Unavailable { message: String },
}

/// Failures of the task runner itself; failures of the unit of work are data in
/// the task's output, never a `RunnerError`
#[derive(Debug, Clone, Error)]
pub enum RunnerError {
    #[error("Task registration failed: {0}")]
    Registration(#[from] RegistryError),

    #[error("Failed to launch task '{name}': {message}")]
    Launch { name: String, message: String },

    #[error("Task '{name}' did not start within {timeout_ms}ms")]
    StartTimeout { name: String, timeout_ms: u64 },

    #[error("Task '{name}' did not complete within {timeout_ms}ms")]
    CompletionTimeout { name: String, timeout_ms: u64 },

    #[error("Task '{name}' was replaced by a newer registration")]
    Replaced { name: String },

    #[error("Invalid task state transition from {from} on '{event}'")]
    InvalidTransition { from: String, event: String },

    #[error("Internal task runner error: {message}")]
    Internal { message: String },
}

impl RunnerError {
    /// Timeouts leave the background work in an unknown state
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::StartTimeout { .. } | Self::CompletionTimeout { .. }
        )
    }
}

pub type RunnerResult<T> = Result<T, RunnerError>;

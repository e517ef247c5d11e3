use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a registered background task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Registered under its name, not yet picked up by the launcher
    #[default]
    Registered,
    /// The background task has reported itself started
    Running,
    /// Unit of work returned a value
    Completed,
    /// Unit of work failed; the failure was recorded as data
    Failed,
    /// Another registration took over the name before this run finished
    Replaced,
}

impl TaskState {
    /// True once the background task has picked up the work
    pub fn has_started(&self) -> bool {
        matches!(self, Self::Running | Self::Completed | Self::Failed)
    }

    /// True when the poller has nothing more to wait for
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Replaced)
    }

    /// True while the handle still owns its name
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Registered | Self::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Replaced => write!(f, "replaced"),
        }
    }
}

impl std::str::FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(Self::Registered),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "replaced" => Ok(Self::Replaced),
            _ => Err(format!("Invalid task state: {s}")),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of one update orchestration run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationPhase {
    /// Mapping the category name to a provider id
    #[default]
    Resolving,
    Searching,
    AcceptingEulas,
    /// Pre-install reboot-pending query
    CheckingReboot,
    Downloading,
    Installing,
    /// Post-install reboot-pending query
    RecheckingReboot,
    Complete,
    /// Entered after the first fatal error; the failing step is kept on the
    /// failure itself
    Failed,
}

impl fmt::Display for OrchestrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolving => write!(f, "resolving"),
            Self::Searching => write!(f, "searching"),
            Self::AcceptingEulas => write!(f, "accepting_eulas"),
            Self::CheckingReboot => write!(f, "checking_reboot"),
            Self::Downloading => write!(f, "downloading"),
            Self::Installing => write!(f, "installing"),
            Self::RecheckingReboot => write!(f, "rechecking_reboot"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

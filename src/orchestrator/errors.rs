use super::states::OrchestrationPhase;
use super::types::UpdateStatus;
use crate::categories::UnknownCategoryError;
use crate::constants::orchestrator::REBOOT_REQUIRED_MESSAGE;
use crate::provider::{OperationResultCode, ProviderError};
use thiserror::Error;

/// Why an orchestration run stopped
#[derive(Debug, Clone, Error)]
pub enum UpdateError {
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategoryError),

    #[error("{}", REBOOT_REQUIRED_MESSAGE)]
    RebootRequired,

    #[error("Failed to download update '{title}' ({update_id}): result {result_code}")]
    DownloadFailed {
        update_id: String,
        title: String,
        result_code: OperationResultCode,
        hresult: Option<i32>,
    },

    #[error("Failed to install update '{title}' ({update_id}): result {result_code}")]
    InstallFailed {
        update_id: String,
        title: String,
        result_code: OperationResultCode,
        hresult: Option<i32>,
    },

    #[error("Update provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl UpdateError {
    /// Bad input; fixing the request and retrying is enough
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnknownCategory(_))
    }

    /// Host state blocks the run until an external action (a reboot)
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::RebootRequired)
    }

    /// A single download or install reported non-success
    pub fn is_operation_failure(&self) -> bool {
        matches!(self, Self::DownloadFailed { .. } | Self::InstallFailed { .. })
    }
}

/// A failed run: the error, where it happened, and the status gathered so far
#[derive(Debug, Clone, Error)]
#[error("{error} (during {phase})")]
pub struct OrchestrationFailure {
    pub error: UpdateError,
    pub phase: OrchestrationPhase,
    pub status: UpdateStatus,
}

impl OrchestrationFailure {
    /// Trace string identifying the failing step
    pub fn location(&self) -> String {
        failure_location(self.phase)
    }
}

pub(crate) fn failure_location(phase: OrchestrationPhase) -> String {
    format!("UpdateOrchestrator::{phase}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reboot_message() {
        assert_eq!(
            UpdateError::RebootRequired.to_string(),
            "A reboot is required before more updates can be installed"
        );
        assert!(UpdateError::RebootRequired.is_precondition());
    }

    #[test]
    fn test_unknown_category_lists_valid_names() {
        let err: UpdateError = "Bogus"
            .parse::<crate::categories::UpdateCategory>()
            .unwrap_err()
            .into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("CriticalUpdates"));
        assert!(err.to_string().contains("Bogus"));
    }

    #[test]
    fn test_operation_failure_message() {
        let err = UpdateError::InstallFailed {
            update_id: "u1".to_string(),
            title: "Cumulative Update".to_string(),
            result_code: OperationResultCode::Aborted,
            hresult: None,
        };
        assert!(err.is_operation_failure());
        assert_eq!(
            err.to_string(),
            "Failed to install update 'Cumulative Update' (u1): result aborted"
        );
    }

    #[test]
    fn test_location_names_phase() {
        assert_eq!(
            failure_location(OrchestrationPhase::Downloading),
            "UpdateOrchestrator::downloading"
        );
    }
}

//! # Update Source Provider
//!
//! Capability interface over the host's update source. The orchestration core
//! drives the update sequence; providers only answer the individual questions
//! (what is pending, download this, install this, is a reboot pending).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pending update as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUpdate {
    /// Opaque, stable identity
    pub id: String,
    pub title: String,
    /// Knowledge base article identifiers
    pub kb_article_ids: Vec<String>,
    /// Classification identifiers the update belongs to
    pub category_ids: Vec<String>,
    pub eula_accepted: bool,
    pub is_downloaded: bool,
}

/// Query sent to the provider's search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub is_installed: bool,
    /// Provider classification id to narrow the search, when the provider can
    pub category_id: Option<String>,
}

impl SearchCriteria {
    /// Items not yet installed, any category
    pub fn pending() -> Self {
        Self {
            is_installed: false,
            category_id: None,
        }
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// Outcome code of a download or install request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResultCode {
    NotStarted,
    InProgress,
    Succeeded,
    SucceededWithErrors,
    Failed,
    Aborted,
}

impl OperationResultCode {
    /// Only a clean success lets the run continue
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Numeric code as reported by the native update agent
    pub fn code(&self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Succeeded => 2,
            Self::SucceededWithErrors => 3,
            Self::Failed => 4,
            Self::Aborted => 5,
        }
    }
}

impl TryFrom<u8> for OperationResultCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NotStarted),
            1 => Ok(Self::InProgress),
            2 => Ok(Self::Succeeded),
            3 => Ok(Self::SucceededWithErrors),
            4 => Ok(Self::Failed),
            5 => Ok(Self::Aborted),
            _ => Err(format!("Invalid operation result code: {value}")),
        }
    }
}

impl fmt::Display for OperationResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::SucceededWithErrors => write!(f, "succeeded_with_errors"),
            Self::Failed => write!(f, "failed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Result of a single download or install request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub result_code: OperationResultCode,
    /// Native error code, when the provider has one
    pub hresult: Option<i32>,
}

impl OperationOutcome {
    pub fn succeeded() -> Self {
        Self {
            result_code: OperationResultCode::Succeeded,
            hresult: None,
        }
    }

    pub fn failed(hresult: i32) -> Self {
        Self {
            result_code: OperationResultCode::Failed,
            hresult: Some(hresult),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result_code.is_success()
    }
}

/// Transport-level provider failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Update search failed: {message}")]
    SearchFailed { message: String },

    #[error("Update {update_id} not known to provider")]
    UnknownUpdate { update_id: String },

    #[error("Provider operation '{operation}' failed: {message}")]
    OperationFailed { operation: String, message: String },

    #[error("Provider unavailable: {message}")]
    Unavailable { message: String },
}

/// Capability interface over the host's update source
#[async_trait]
pub trait UpdateSourceProvider: Send + Sync {
    /// Provider name for logging
    fn provider_name(&self) -> &str;

    /// List updates matching the criteria
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ProviderUpdate>, ProviderError>;

    /// Record license acceptance for one update
    async fn accept_eula(&self, update_id: &str) -> Result<(), ProviderError>;

    /// Download exactly one update
    async fn download(&self, update: &ProviderUpdate) -> Result<OperationOutcome, ProviderError>;

    /// Install exactly one (already downloaded) update
    async fn install(&self, update: &ProviderUpdate) -> Result<OperationOutcome, ProviderError>;

    /// Whether the host currently has a reboot pending
    async fn reboot_required(&self) -> Result<bool, ProviderError>;
}

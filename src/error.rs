//! # Crate Error Types
//!
//! Top-level error that wraps every layer's structured error, so callers that do
//! not care about the layer can propagate a single type with `?`.

use crate::config::ConfigurationError;
use crate::orchestrator::UpdateError;
use crate::provider::ProviderError;
use crate::runner::{RegistryError, RunnerError};

#[derive(Debug, thiserror::Error)]
pub enum HostUpdateError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Task runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Task registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Update orchestration error: {0}")]
    Update(#[from] UpdateError),

    #[error("Update provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HostUpdateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::UpdateCategory;
    use crate::config::HostUpdateConfig;
    use crate::orchestrator::UpdateError;

    fn default_category(config: &HostUpdateConfig) -> Result<UpdateCategory> {
        config.validate()?;
        let category: UpdateCategory = config
            .orchestrator
            .default_category
            .parse()
            .map_err(UpdateError::from)?;
        Ok(category)
    }

    #[test]
    fn test_layer_errors_convert_with_question_mark() {
        let mut config = HostUpdateConfig::default();
        assert_eq!(
            default_category(&config).unwrap(),
            UpdateCategory::CriticalUpdates
        );

        config.runner.start_timeout_ms = 0;
        let err = default_category(&config).unwrap_err();
        assert!(matches!(err, HostUpdateError::Configuration(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}

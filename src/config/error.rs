//! Errors raised while locating, reading and validating `hostupdate-config.yaml`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// None of the candidate file names exist in the config directory
    #[error("no hostupdate configuration found (looked for {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is {size} bytes, larger than the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{} is not a regular file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("{} does not describe a valid configuration: {message}", .path.display())]
    InvalidYaml { path: PathBuf, message: String },

    #[error("`{field}` must be set")]
    MissingField { field: &'static str },

    #[error("`{field}` = {value:?} rejected: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigurationError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_yaml(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::InvalidYaml {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn invalid_value(
        field: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the failure is about the file itself rather than its contents
    pub fn is_file_problem(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Unreadable { .. }
                | Self::TooLarge { .. }
                | Self::NotAFile { .. }
        )
    }

    /// The dotted field path a validation failure refers to
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field } | Self::InvalidValue { field, .. } => Some(*field),
            _ => None,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;

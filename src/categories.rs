//! # Update Categories
//!
//! Static table mapping human-readable update category names to the
//! provider-specific classification identifiers. Resolution is exact-match only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Update classifications accepted in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateCategory {
    Application,
    Connectors,
    CriticalUpdates,
    DefinitionUpdates,
    DeveloperKits,
    FeaturePacks,
    Guidance,
    SecurityUpdates,
    ServicePacks,
    Tools,
    UpdateRollups,
    Updates,
}

impl UpdateCategory {
    pub const ALL: [UpdateCategory; 12] = [
        Self::Application,
        Self::Connectors,
        Self::CriticalUpdates,
        Self::DefinitionUpdates,
        Self::DeveloperKits,
        Self::FeaturePacks,
        Self::Guidance,
        Self::SecurityUpdates,
        Self::ServicePacks,
        Self::Tools,
        Self::UpdateRollups,
        Self::Updates,
    ];

    /// Request-facing name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::Connectors => "Connectors",
            Self::CriticalUpdates => "CriticalUpdates",
            Self::DefinitionUpdates => "DefinitionUpdates",
            Self::DeveloperKits => "DeveloperKits",
            Self::FeaturePacks => "FeaturePacks",
            Self::Guidance => "Guidance",
            Self::SecurityUpdates => "SecurityUpdates",
            Self::ServicePacks => "ServicePacks",
            Self::Tools => "Tools",
            Self::UpdateRollups => "UpdateRollups",
            Self::Updates => "Updates",
        }
    }

    /// Provider classification identifier
    pub fn provider_id(&self) -> &'static str {
        match self {
            Self::Application => "5C9376AB-8CE6-464A-B136-22113DD69801",
            Self::Connectors => "434DE588-ED14-48F5-8EED-A15E09A991F6",
            Self::CriticalUpdates => "E6CF1350-C01B-414D-A61F-263D14D133B4",
            Self::DefinitionUpdates => "E0789628-CE08-4437-BE74-2495B842F43B",
            Self::DeveloperKits => "E140075D-8433-45C3-AD87-E72345B36078",
            Self::FeaturePacks => "B54E7D24-7ADD-428F-8B75-90A396FA584F",
            Self::Guidance => "9511D615-35B2-47BB-927F-F73D8E9260BB",
            Self::SecurityUpdates => "0FA1201D-4330-4FA8-8AE9-B877473B6441",
            Self::ServicePacks => "68C5B0A3-D1A6-4553-AE49-01D3A7827828",
            Self::Tools => "B4832BD8-E735-4761-8DAF-37F882276DAB",
            Self::UpdateRollups => "28BC880E-0592-4CBF-8F95-C79B17911D5F",
            Self::Updates => "CD5FFD1E-E932-4E3A-BF74-18BF0B1BBD83",
        }
    }

    /// Every valid name, in table order
    pub fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(UpdateCategory::name).collect()
    }
}

impl fmt::Display for UpdateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised for names outside the table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown update category '{name}'; valid categories are: {}", valid.join(", "))]
pub struct UnknownCategoryError {
    pub name: String,
    pub valid: Vec<&'static str>,
}

impl FromStr for UpdateCategory {
    type Err = UnknownCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.name() == s)
            .ok_or_else(|| UnknownCategoryError {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

//! Per-tier `config.toml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::ConfigError;

/// Individual-tier switch from the project config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualOverrides {
    /// Whether per-developer material is folded in
    #[serde(default)]
    pub enabled: bool,
}

/// Exclusions declared for one role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Title substrings removed for this role (case-insensitive)
    #[serde(default)]
    pub exclude_sections: Vec<String>,
}

/// Contents of one tier's `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Titles of this tier's sections that later tiers may not override
    #[serde(default)]
    pub locked_sections: Vec<String>,

    /// Active role (project tier)
    #[serde(default)]
    pub primary_role: Option<String>,

    /// Individual tier switch (project tier)
    #[serde(default)]
    pub individual_overrides: IndividualOverrides,

    /// Role exclusions (organization tier)
    #[serde(default)]
    pub roles: BTreeMap<String, RoleConfig>,
}

impl TierConfig {
    /// Load and parse a tier config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse a tier config from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: TierConfig = toml::from_str(s).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locked_sections.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "locked_sections must not contain empty titles".to_string(),
            ));
        }

        if let Some(role) = &self.primary_role {
            if role.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "primary_role must not be empty".to_string(),
                ));
            }
        }

        for (role, config) in &self.roles {
            if config.exclude_sections.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "roles.{}.exclude_sections must not contain empty keywords",
                    role
                )));
            }
        }

        Ok(())
    }

    /// Whether a section title is locked by this tier
    pub fn is_locked(&self, title: &str) -> bool {
        let title = title.trim();
        self.locked_sections
            .iter()
            .any(|locked| locked.trim().eq_ignore_ascii_case(title))
    }
}

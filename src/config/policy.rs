//! Effective policy configuration with provenance
//!
//! Combines the per-tier config files into the two settings the resolver
//! consumes: the active role's exclusions and the individual tier switch.
//! Every contributing file is recorded with the SHA-256 of its raw bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tiered_section::Tier;

use super::tier_config::TierConfig;
use super::ConfigError;

/// Role assumed when the project config names none
pub const DEFAULT_ROLE: &str = "fullstack";

/// A contributing config file with provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Tier the file belongs to
    pub tier: Tier,

    /// File path
    pub path: String,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// Lowercased exclusion keywords for the active role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleExclusions {
    pub role: String,
    pub keywords: Vec<String>,
}

impl RoleExclusions {
    pub fn new(role: impl Into<String>, keywords: &[String]) -> Self {
        Self {
            role: role.into(),
            keywords: keywords.iter().map(|k| k.trim().to_lowercase()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Effective policy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Per-tier configs, missing files as defaults
    pub tiers: BTreeMap<Tier, TierConfig>,

    /// Active role
    pub active_role: String,

    /// Whether the individual tier is folded in
    pub individual_enabled: bool,

    /// Contributing files in fold order
    pub sources: Vec<ConfigSource>,
}

impl PolicyConfig {
    /// Build the policy from optional config file paths.
    ///
    /// Missing files contribute defaults. Unreadable or malformed files are
    /// errors.
    pub fn build(
        universal: Option<&Path>,
        organization: Option<&Path>,
        project: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut tiers = BTreeMap::new();
        let mut sources = Vec::new();

        for (tier, path) in [
            (Tier::Universal, universal),
            (Tier::Organization, organization),
            (Tier::Project, project),
        ] {
            let config = match path {
                Some(path) if path.exists() => {
                    let (config, digest) = Self::load_toml_file(path)?;
                    sources.push(ConfigSource {
                        tier,
                        path: path.to_string_lossy().to_string(),
                        digest,
                    });
                    config
                }
                _ => TierConfig::default(),
            };
            tiers.insert(tier, config);
        }

        Ok(Self::from_tiers(tiers, sources))
    }

    /// Build the policy from already parsed tier configs
    pub fn from_tiers(tiers: BTreeMap<Tier, TierConfig>, sources: Vec<ConfigSource>) -> Self {
        let project = tiers.get(&Tier::Project);
        let active_role = project
            .and_then(|c| c.primary_role.clone())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());
        let individual_enabled = project
            .map(|c| c.individual_overrides.enabled)
            .unwrap_or(false);

        Self {
            tiers,
            active_role,
            individual_enabled,
            sources,
        }
    }

    /// Replace the active role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.active_role = role.into();
        self
    }

    /// Config for one tier (defaults when absent)
    pub fn tier(&self, tier: Tier) -> TierConfig {
        self.tiers.get(&tier).cloned().unwrap_or_default()
    }

    /// Exclusions for the active role, if the organization declares any
    pub fn exclusions(&self) -> Option<RoleExclusions> {
        let role = self
            .tiers
            .get(&Tier::Organization)?
            .roles
            .get(&self.active_role)?;
        let exclusions = RoleExclusions::new(self.active_role.clone(), &role.exclude_sections);
        if exclusions.is_empty() {
            None
        } else {
            Some(exclusions)
        }
    }

    /// Load and parse a TOML file, returning the config and digest
    fn load_toml_file(path: &Path) -> Result<(TierConfig, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: format!("Invalid UTF-8: {}", e),
        })?;

        let config = TierConfig::parse(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        Ok((config, digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_build_with_no_files() {
        let policy = PolicyConfig::build(None, None, None).unwrap();
        assert_eq!(policy.active_role, DEFAULT_ROLE);
        assert!(!policy.individual_enabled);
        assert!(policy.exclusions().is_none());
        assert!(policy.sources.is_empty());
    }

    #[test]
    fn test_missing_paths_are_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let policy = PolicyConfig::build(Some(&missing), Some(&missing), Some(&missing)).unwrap();
        assert!(policy.sources.is_empty());
        assert_eq!(policy.tier(Tier::Organization), TierConfig::default());
    }

    #[test]
    fn test_roles_only_from_organization() {
        let dir = tempfile::tempdir().unwrap();
        let org = write(dir.path(), "org.toml", "[roles.backend]\nexclude_sections = [\"Frontend\"]\n");
        let project = write(
            dir.path(),
            "project.toml",
            "primary_role = \"backend\"\n[individual_overrides]\nenabled = true\n[roles.backend]\nexclude_sections = [\"ignored\"]\n",
        );

        let policy = PolicyConfig::build(None, Some(&org), Some(&project)).unwrap();
        assert_eq!(policy.active_role, "backend");
        assert!(policy.individual_enabled);

        let exclusions = policy.exclusions().unwrap();
        assert_eq!(exclusions.keywords, vec!["frontend"]);
        assert_eq!(policy.sources.len(), 2);
        assert_eq!(policy.sources[0].tier, Tier::Organization);
        assert_eq!(policy.sources[0].digest.len(), 64);
    }

    #[test]
    fn test_individual_switch_only_from_project() {
        let dir = tempfile::tempdir().unwrap();
        let org = write(dir.path(), "org.toml", "[individual_overrides]\nenabled = true\n");
        let policy = PolicyConfig::build(None, Some(&org), None).unwrap();
        assert!(!policy.individual_enabled);
    }

    #[test]
    fn test_role_override() {
        let dir = tempfile::tempdir().unwrap();
        let org = write(dir.path(), "org.toml", "[roles.qa]\nexclude_sections = [\"deploy\"]\n");
        let policy = PolicyConfig::build(None, Some(&org), None).unwrap();
        assert!(policy.exclusions().is_none());

        let policy = policy.with_role("qa");
        assert_eq!(policy.exclusions().unwrap().role, "qa");
    }

    #[test]
    fn test_empty_exclusions_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let org = write(dir.path(), "org.toml", "[roles.fullstack]\n");
        let policy = PolicyConfig::build(None, Some(&org), None).unwrap();
        assert!(policy.exclusions().is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "bad.toml", "roles = 7");
        let err = PolicyConfig::build(None, None, Some(&bad)).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}

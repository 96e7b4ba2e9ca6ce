//! Tier configuration and policy
//!
//! Each tier may carry a `config.toml` next to its material:
//! 1. Universal: locked sections only
//! 2. Organization: locked sections and role exclusions
//! 3. Project: locked sections, active role, individual override switch
//!
//! Roles are only read from the organization tier and the active role and
//! individual switch only from the project tier.

mod policy;
mod tier_config;

pub use policy::{ConfigSource, PolicyConfig, RoleExclusions, DEFAULT_ROLE};
pub use tier_config::{IndividualOverrides, RoleConfig, TierConfig};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

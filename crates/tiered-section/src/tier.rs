//! Configuration tiers in fold order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four ordered configuration layers.
///
/// Later tiers may add sections and, within permission limits, replace
/// sections set by earlier tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Shared base material every project starts from
    Universal,
    /// Organization standards and non-bypassable policy
    Organization,
    /// Project-specific customizations
    Project,
    /// Per-developer preferences
    Individual,
}

impl Tier {
    /// All tiers in the order they are folded.
    pub const ORDER: [Tier; 4] = [
        Tier::Universal,
        Tier::Organization,
        Tier::Project,
        Tier::Individual,
    ];

    /// Lowercase tier name
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Universal => "universal",
            Tier::Organization => "organization",
            Tier::Project => "project",
            Tier::Individual => "individual",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognised tier names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier: {0}")]
pub struct TierParseError(pub String);

impl FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "universal" => Ok(Tier::Universal),
            "organization" | "company" => Ok(Tier::Organization),
            "project" => Ok(Tier::Project),
            "individual" | "developer" => Ok(Tier::Individual),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

//! Override resolver
//!
//! Folds the tier mappings in the fixed order
//! universal → organization → project → individual into one resolved
//! mapping:
//! - New identities are always inserted
//! - Locked organization sections reject every later override and the
//!   attempt is recorded as a policy violation
//! - Individual material may only replace project or individual sections
//! - Everything else replaces, even when the content is identical
//!
//! The role filter runs once, right after the organization tier.

mod fold;
mod rules;

pub use fold::{resolve, TierStack};
pub use rules::{decide, OverrideDecision};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tiered_section::{SectionMap, Tier};

/// Policy text attached to violations
pub const ORGANIZATION_POLICY: &str = "Cannot override organization policy";

/// A rejected override of a locked organization section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyViolation {
    /// Section identity
    pub identity: String,

    /// Section title
    pub title: String,

    /// Tier whose override was rejected
    pub attempted_by: Tier,

    /// Tier holding the locked value
    pub locked_by: Tier,

    /// Policy that was enforced
    pub policy: String,
}

/// Why an override was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Locked organization section
    PolicyLocked,
    /// Individual tier targeting a universal or organization section
    IndividualScope,
}

/// Any override the resolver refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub identity: String,
    pub attempted_by: Tier,
    pub existing_tier: Tier,
    pub reason: RejectionReason,
}

/// Result of folding all tiers
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Resolved mapping
    pub sections: SectionMap,

    /// Policy violations, in the order they were attempted
    pub violations: Vec<PolicyViolation>,

    /// Every rejected override, policy and individual scope alike
    pub rejections: Vec<Rejection>,

    /// Identities replaced with identical content, with the tier that did it
    pub reaffirmed: Vec<(String, Tier)>,

    /// Identities removed by the role filter
    pub role_removed: Vec<String>,

    /// Number of sections each tier supplied
    pub supplied: BTreeMap<Tier, usize>,
}

impl Resolution {
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

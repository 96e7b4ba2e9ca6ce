//! Change auditor
//!
//! Diffs a before/after mapping pair into added, removed, modified and
//! reaffirmed sets. Policy violations are never inferred from the diff: a
//! rejected override leaves no trace in the after mapping, so they are
//! taken as recorded by the resolver.

mod report;

pub use report::{PREVIEW_LINES, REPORT_RULE_WIDTH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tiered_section::{SectionMap, Tier};

use crate::resolve::PolicyViolation;

/// One changed section with its provenance before and after
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeItem {
    /// Section identity
    pub identity: String,

    /// Section title
    pub title: String,

    /// Tier before the change (None when added)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_before: Option<Tier>,

    /// Tier after the change (None when removed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_after: Option<Tier>,
}

/// Counts per change kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub reaffirmed: usize,
    pub policy_violations: usize,
}

/// Structured change report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReport {
    /// When this report was produced
    pub generated_at: DateTime<Utc>,

    /// Summary counts
    pub counts: ChangeCounts,

    /// Present after, absent before
    pub added: Vec<ChangeItem>,

    /// Present before, absent after
    pub removed: Vec<ChangeItem>,

    /// Present in both with different fingerprints
    pub modified: Vec<ChangeItem>,

    /// Present in both with the same fingerprint but a different tier
    pub reaffirmed: Vec<ChangeItem>,

    /// Rejected overrides of locked organization sections
    pub policy_violations: Vec<PolicyViolation>,
}

impl ChangeReport {
    /// True when nothing was added, removed or modified
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn has_violations(&self) -> bool {
        !self.policy_violations.is_empty()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Diff two mappings without violations
pub fn diff(before: &SectionMap, after: &SectionMap) -> ChangeReport {
    audit(before, after, &[])
}

/// Diff two mappings and attach the violations recorded during resolution
pub fn audit(before: &SectionMap, after: &SectionMap, violations: &[PolicyViolation]) -> ChangeReport {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut modified = Vec::new();
    let mut reaffirmed = Vec::new();

    for (identity, section) in after {
        match before.get(identity) {
            None => added.push(ChangeItem {
                identity: identity.clone(),
                title: section.title().to_string(),
                tier_before: None,
                tier_after: Some(section.tier()),
            }),
            Some(previous) if !previous.same_content(section) => modified.push(ChangeItem {
                identity: identity.clone(),
                title: section.title().to_string(),
                tier_before: Some(previous.tier()),
                tier_after: Some(section.tier()),
            }),
            Some(previous) if previous.tier() != section.tier() => reaffirmed.push(ChangeItem {
                identity: identity.clone(),
                title: section.title().to_string(),
                tier_before: Some(previous.tier()),
                tier_after: Some(section.tier()),
            }),
            Some(_) => {}
        }
    }

    for (identity, section) in before {
        if !after.contains_key(identity) {
            removed.push(ChangeItem {
                identity: identity.clone(),
                title: section.title().to_string(),
                tier_before: Some(section.tier()),
                tier_after: None,
            });
        }
    }

    let counts = ChangeCounts {
        added: added.len(),
        removed: removed.len(),
        modified: modified.len(),
        reaffirmed: reaffirmed.len(),
        policy_violations: violations.len(),
    };

    ChangeReport {
        generated_at: Utc::now(),
        counts,
        added,
        removed,
        modified,
        reaffirmed,
        policy_violations: violations.to_vec(),
    }
}

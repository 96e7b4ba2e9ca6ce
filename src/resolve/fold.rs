//! Tier fold

use std::collections::BTreeMap;
use tiered_section::{SectionMap, Tier};

use super::rules::{decide, OverrideDecision};
use super::{PolicyViolation, Rejection, RejectionReason, Resolution, ORGANIZATION_POLICY};
use crate::config::RoleExclusions;
use crate::filter::apply_role_filter;

/// Per-tier mappings, iterated in fold order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierStack {
    tiers: BTreeMap<Tier, SectionMap>,
}

impl TierStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`TierStack::insert`]
    pub fn with_tier(mut self, tier: Tier, sections: SectionMap) -> Self {
        self.insert(tier, sections);
        self
    }

    /// Set a tier's mapping.
    ///
    /// Sections are keyed by their own identity. Sections attributed to a
    /// different tier than the slot are dropped.
    pub fn insert(&mut self, tier: Tier, sections: SectionMap) {
        let mut normalized = SectionMap::new();
        for (key, section) in sections {
            if section.tier() != tier {
                tracing::warn!(
                    identity = section.identity(),
                    section_tier = %section.tier(),
                    slot = %tier,
                    "dropping section supplied under the wrong tier"
                );
                continue;
            }
            if key != section.identity() {
                tracing::warn!(
                    key = %key,
                    identity = section.identity(),
                    "section keyed under a different identity, re-keyed"
                );
            }
            normalized.insert(section.identity().to_string(), section);
        }
        self.tiers.insert(tier, normalized);
    }

    /// A tier's mapping, if one was supplied
    pub fn get(&self, tier: Tier) -> Option<&SectionMap> {
        self.tiers.get(&tier)
    }
}

/// Fold every tier of the stack into one resolved mapping.
///
/// `exclusions` are applied once, immediately after the organization tier.
pub fn resolve(stack: &TierStack, exclusions: Option<&RoleExclusions>) -> Resolution {
    let mut resolution = Resolution::default();
    let mut filtered = false;

    for tier in Tier::ORDER {
        let incoming = stack.get(tier);
        resolution
            .supplied
            .insert(tier, incoming.map(|m| m.len()).unwrap_or(0));

        if let Some(incoming) = incoming {
            fold_tier(&mut resolution, tier, incoming);
            tracing::info!(
                tier = %tier,
                supplied = incoming.len(),
                resolved = resolution.sections.len(),
                "applied tier"
            );
        }

        if tier == Tier::Organization && !filtered {
            filtered = true;
            if let Some(exclusions) = exclusions.filter(|e| !e.is_empty()) {
                let outcome = apply_role_filter(std::mem::take(&mut resolution.sections), exclusions);
                if !outcome.removed.is_empty() {
                    tracing::info!(
                        role = %exclusions.role,
                        removed = outcome.removed.len(),
                        "role filter removed sections"
                    );
                }
                resolution.sections = outcome.kept;
                resolution.role_removed = outcome.removed;
            }
        }
    }

    resolution
}

fn fold_tier(resolution: &mut Resolution, tier: Tier, incoming: &SectionMap) {
    for (identity, section) in incoming {
        let decision = decide(resolution.sections.get(identity), section);
        let existing = resolution
            .sections
            .get(identity)
            .map(|e| (e.title().to_string(), e.tier()));

        match (decision, existing) {
            (OverrideDecision::RejectPolicy, Some((title, locked_by))) => {
                tracing::warn!(
                    identity = %identity,
                    attempted_by = %tier,
                    "cannot override organization policy"
                );
                resolution.violations.push(PolicyViolation {
                    identity: identity.clone(),
                    title,
                    attempted_by: tier,
                    locked_by,
                    policy: ORGANIZATION_POLICY.to_string(),
                });
                resolution.rejections.push(Rejection {
                    identity: identity.clone(),
                    attempted_by: tier,
                    existing_tier: locked_by,
                    reason: RejectionReason::PolicyLocked,
                });
            }
            (OverrideDecision::RejectIndividualScope, Some((_, existing_tier))) => {
                tracing::warn!(
                    identity = %identity,
                    "individual tier cannot override {} section",
                    existing_tier
                );
                resolution.rejections.push(Rejection {
                    identity: identity.clone(),
                    attempted_by: tier,
                    existing_tier,
                    reason: RejectionReason::IndividualScope,
                });
            }
            (OverrideDecision::Reaffirm, _) => {
                tracing::debug!(identity = %identity, tier = %tier, "reaffirmed with identical content");
                resolution.reaffirmed.push((identity.clone(), tier));
                resolution.sections.insert(identity.clone(), section.clone());
            }
            (decision, _) => {
                tracing::debug!(identity = %identity, tier = %tier, ?decision, "section set");
                resolution.sections.insert(identity.clone(), section.clone());
            }
        }
    }
}

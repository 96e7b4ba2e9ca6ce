//! Per-section override rules
//!
//! The decision always consults the currently accumulated section, not the
//! tier the identity first appeared in.

use serde::{Deserialize, Serialize};
use tiered_section::{Section, Tier};

/// What folding one incoming section does to the accumulated mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideDecision {
    /// Identity not present yet
    Insert,
    /// Replace with different content
    Replace,
    /// Replace with identical content; provenance still moves to the incoming tier
    Reaffirm,
    /// Existing section is an organization section marked not overridable
    RejectPolicy,
    /// Individual material may not replace universal or organization sections
    RejectIndividualScope,
}

/// Decide how `incoming` folds over `existing`
pub fn decide(existing: Option<&Section>, incoming: &Section) -> OverrideDecision {
    let Some(existing) = existing else {
        return OverrideDecision::Insert;
    };

    if !existing.override_allowed() && existing.tier() == Tier::Organization {
        return OverrideDecision::RejectPolicy;
    }

    if incoming.tier() == Tier::Individual
        && matches!(existing.tier(), Tier::Universal | Tier::Organization)
    {
        return OverrideDecision::RejectIndividualScope;
    }

    if existing.same_content(incoming) {
        OverrideDecision::Reaffirm
    } else {
        OverrideDecision::Replace
    }
}

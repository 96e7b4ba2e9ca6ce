//! Role filter
//!
//! Removes sections whose title contains one of the active role's
//! exclusion keywords. Filtering is an organization-level convenience, not a
//! policy boundary, so removals never produce policy violations.

use tiered_section::SectionMap;

use crate::config::RoleExclusions;

/// Result of a filter pass
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Sections that survived
    pub kept: SectionMap,
    /// Identities removed, in identity order
    pub removed: Vec<String>,
}

/// Whether a title matches any lowercase keyword (case-insensitive substring)
pub fn is_excluded(title: &str, keywords: &[String]) -> bool {
    let title = title.to_lowercase();
    keywords.iter().any(|keyword| title.contains(keyword.as_str()))
}

/// Split a mapping into kept and removed sections
pub fn apply_role_filter(mapping: SectionMap, exclusions: &RoleExclusions) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for (identity, section) in mapping {
        if is_excluded(section.title(), &exclusions.keywords) {
            tracing::debug!(identity = %identity, role = %exclusions.role, "excluded for role");
            outcome.removed.push(identity);
        } else {
            outcome.kept.insert(identity, section);
        }
    }
    outcome
}

/// Mapping with every excluded section removed
pub fn filter(mapping: SectionMap, exclusions: &RoleExclusions) -> SectionMap {
    apply_role_filter(mapping, exclusions).kept
}

//! Tier loaders
//!
//! A loader turns one tier's source material into a mapping of section
//! identity to [`Section`]. Loaders are idempotent: the same material
//! yields identical sections. A tier with no material yields an empty
//! mapping, never an error.

mod fs;
mod memory;

pub use fs::{FsTierLoader, SourceLayout};
pub use memory::MemoryTierLoader;

use tiered_section::{Section, SectionMap, Tier};

/// Loader errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The tier's source material exists but could not be read
    #[error("{tier} tier unavailable: {reason}")]
    Unavailable { tier: Tier, reason: String },
}

impl LoadError {
    pub fn unavailable(tier: Tier, reason: impl Into<String>) -> Self {
        LoadError::Unavailable {
            tier,
            reason: reason.into(),
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            LoadError::Unavailable { tier, .. } => *tier,
        }
    }
}

/// Source of per-tier sections
pub trait TierLoader {
    /// Load every section the tier supplies
    fn load(&self, tier: Tier) -> Result<SectionMap, LoadError>;
}

/// Insert sections keyed by identity; a later duplicate replaces an earlier one.
pub(crate) fn collect_sections(
    map: &mut SectionMap,
    sections: impl IntoIterator<Item = Section>,
) {
    for section in sections {
        if let Some(previous) = map.insert(section.identity().to_string(), section) {
            tracing::debug!(
                identity = previous.identity(),
                tier = %previous.tier(),
                "duplicate heading within tier, last one wins"
            );
        }
    }
}

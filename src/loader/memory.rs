//! In-memory tier material

use std::collections::BTreeMap;
use tiered_section::{split_sections, SectionMap, Tier};

use super::{collect_sections, LoadError, TierLoader};

/// Loader serving text held in memory, one document per tier.
#[derive(Debug, Clone, Default)]
pub struct MemoryTierLoader {
    texts: BTreeMap<Tier, String>,
    locked: BTreeMap<Tier, Vec<String>>,
    unavailable: BTreeMap<Tier, String>,
}

impl MemoryTierLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a tier's material
    pub fn with_text(mut self, tier: Tier, text: impl Into<String>) -> Self {
        self.texts.insert(tier, text.into());
        self
    }

    /// Mark titles of a tier as not overridable
    pub fn with_locked(mut self, tier: Tier, titles: &[&str]) -> Self {
        self.locked
            .entry(tier)
            .or_default()
            .extend(titles.iter().map(|t| t.to_string()));
        self
    }

    /// Make a tier fail to load
    pub fn with_unavailable(mut self, tier: Tier, reason: impl Into<String>) -> Self {
        self.unavailable.insert(tier, reason.into());
        self
    }
}

impl TierLoader for MemoryTierLoader {
    fn load(&self, tier: Tier) -> Result<SectionMap, LoadError> {
        if let Some(reason) = self.unavailable.get(&tier) {
            return Err(LoadError::unavailable(tier, reason.clone()));
        }

        let mut map = SectionMap::new();
        let Some(text) = self.texts.get(&tier) else {
            return Ok(map);
        };

        let locked = self.locked.get(&tier);
        let sections = split_sections(text).into_iter().map(|raw| {
            let is_locked = locked
                .map(|titles| titles.iter().any(|t| t.eq_ignore_ascii_case(&raw.title)))
                .unwrap_or(false);
            raw.into_section(tier).with_override_allowed(!is_locked)
        });
        collect_sections(&mut map, sections);

        Ok(map)
    }
}
